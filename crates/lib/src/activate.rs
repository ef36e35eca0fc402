//! Build directory naming and activation.
//!
//! Each combo maps to one human-readable directory under `Build/`. The
//! `Build/Active` link always points at the most recently activated one and
//! is the durable hand-off between separate invocations (IDE integration,
//! `compile_commands.json` lookup). Within one invocation stages receive the
//! [`BuildDir`] handle directly instead of going through the link.
//!
//! The link has no writer besides [`activate`]. Concurrent activations from
//! separate processes are not serialized; the last writer wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::combo::Combo;
use crate::platform::link::{link_dir, read_dir_link, unlink_dir};
use crate::platform::{HostOs, ProjectDirs};
use crate::report::Reporter;

#[derive(Debug, Error)]
pub enum ActivateError {
  #[error("failed to create build directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// An activated build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDir {
  pub name: String,
  pub path: PathBuf,
}

impl BuildDir {
  pub fn path(&self) -> &Path {
    &self.path
  }
}

/// Deterministic directory name for `combo` built on `host`.
pub fn build_dir_name(host: HostOs, combo: &Combo) -> String {
  format!(
    "{}_{}_{}_{}_{}_{}_{}",
    host, combo.targetos, combo.builder, combo.toolchain, combo.platform, combo.architecture, combo.config
  )
  .replace(' ', "-")
}

/// Create the combo's build directory (if needed) and repoint `Build/Active` at it.
///
/// Failing to create the link is reported but not fatal.
pub fn activate(dirs: &ProjectDirs, host: HostOs, combo: &Combo, reporter: &Reporter) -> Result<BuildDir, ActivateError> {
  let name = build_dir_name(host, combo);
  let path = dirs.build.join(&name);

  fs::create_dir_all(&path).map_err(|source| ActivateError::CreateDir {
    path: path.clone(),
    source,
  })?;

  let active = dirs.active_link();
  let relinked = unlink_dir(&active).and_then(|_| link_dir(&Path::new(".").join(&name), &active));
  match relinked {
    Ok(()) => {
      info!(build_dir = %name, "activated build directory");
      reporter.log(&format!("Activated {name}"));
    }
    Err(e) => {
      warn!(link = %active.display(), error = %e, "could not update active build link");
      reporter.diagnostic(&format!("Could not link {} to {name}: {e}", active.display()));
    }
  }

  Ok(BuildDir { name, path })
}

/// Name of the directory the Active link currently points to, if any.
pub fn active_build_name(dirs: &ProjectDirs) -> Option<String> {
  read_dir_link(&dirs.active_link())
    .and_then(|target| target.file_name().map(|name| name.to_string_lossy().into_owned()))
}
