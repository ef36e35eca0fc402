//! Generator argument synthesis.
//!
//! Turns a [`Combo`] plus the version identity into the argument list for the
//! generator's configure step. Arguments are emitted in a fixed order and are
//! never deduplicated; the generator applies repeated definitions last-wins.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::combo::{Combo, X64};
use crate::consts::EMSCRIPTEN_ENV;
use crate::platform::HostOs;
use crate::version::{CHANGESET_VAR, REVISION_VAR, VersionIdentity, var_name};

#[derive(Debug, Error)]
pub enum FlagError {
  #[error("cannot find {var} environment variable (required by the {toolchain} toolchain)")]
  MissingToolchainRoot { var: &'static str, toolchain: String },
}

/// Read the WebAssembly toolchain root from the environment.
pub fn emscripten_root_from_env() -> Option<PathBuf> {
  std::env::var_os(EMSCRIPTEN_ENV)
    .filter(|value| !value.is_empty())
    .map(PathBuf::from)
}

/// Inputs to [`synthesize`] besides the combo itself.
#[derive(Debug, Clone)]
pub struct FlagContext<'a> {
  pub host: HostOs,
  pub version: &'a VersionIdentity,
  pub source_dir: &'a Path,
  pub emscripten_root: Option<&'a Path>,
}

/// Produce the configure arguments for `combo`.
pub fn synthesize(combo: &Combo, ctx: &FlagContext<'_>) -> Result<Vec<String>, FlagError> {
  let version = ctx.version;
  let mut args = vec![
    define(&var_name(REVISION_VAR), &version.revision),
    define(&var_name("SHORT_CHANGESET"), &version.short_changeset),
    define(&var_name(CHANGESET_VAR), &version.changeset),
    define(&var_name("CHANGESET_DATE"), &format!("\"{}\"", version.changeset_date)),
    "-G".to_string(),
    combo.builder.clone(),
  ];

  if combo.uses_ninja() {
    // The generator does not always find the build program on its own
    args.push(define("CMAKE_MAKE_PROGRAM", "ninja"));
  }

  args.push(define(&var_name("TOOLCHAIN"), &combo.toolchain));
  args.extend(toolchain_args(combo, ctx)?);
  args.push(define(&var_name("PLATFORM"), &combo.platform));
  args.push(define(&var_name("ARCHITECTURE"), &combo.architecture));

  if combo.is_msvc() && combo.architecture == X64 {
    args.push(define("CMAKE_GENERATOR_PLATFORM", "x64"));
    args.push("-T".to_string());
    args.push("host=x64".to_string());
  }

  // MSVC selects the configuration at build time instead
  if !combo.is_msvc() {
    args.push(define("CMAKE_BUILD_TYPE", &combo.config));
    args.push(define("CMAKE_EXPORT_COMPILE_COMMANDS", "1"));
  }

  args.push(define(&var_name("HOSTOS"), ctx.host.as_str()));
  args.push(define(&var_name("TARGETOS"), &combo.targetos));
  args.push(ctx.source_dir.display().to_string());

  Ok(args)
}

fn toolchain_args(combo: &Combo, ctx: &FlagContext<'_>) -> Result<Vec<String>, FlagError> {
  let mut args = Vec::new();

  if combo.is_emscripten() {
    let root = ctx.emscripten_root.ok_or_else(|| FlagError::MissingToolchainRoot {
      var: EMSCRIPTEN_ENV,
      toolchain: combo.toolchain.clone(),
    })?;
    let toolchain_file = root.join("cmake").join("Modules").join("Platform").join("Emscripten.cmake");
    args.push(define("CMAKE_TOOLCHAIN_FILE", &toolchain_file.display().to_string()));
    args.push(define("EMSCRIPTEN_GENERATE_BITCODE_STATIC_LIBRARIES", "1"));
  }

  if combo.is_clang() {
    if ctx.host == HostOs::Windows {
      // Keeps the generator from probing for the native MSVC toolchain
      args.push(define("CMAKE_SYSTEM_NAME", "Generic"));
    }
    args.push(define("CMAKE_C_COMPILER:PATH", "clang"));
    args.push(define("CMAKE_CXX_COMPILER:PATH", "clang++"));
    args.push(define("CMAKE_C_COMPILER_ID", "Clang"));
    args.push(define("CMAKE_CXX_COMPILER_ID", "Clang"));
    args.push(define("CMAKE_LINKER", "lld"));
    args.push(define("CMAKE_AR", "/usr/bin/llvm-ar"));
  }

  Ok(args)
}

fn define(name: &str, value: &str) -> String {
  format!("-D{name}={value}")
}
