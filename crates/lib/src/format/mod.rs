//! Source formatting pipeline.
//!
//! Passes run in a fixed order over the native sources under `Libraries/`:
//! eslint over the whole repository, clang-tidy (opt-in), clang-format, and
//! finally the house normalisation. Every pass runs in one of two modes:
//!
//! - [`FormatMode::Fix`] rewrites a file in place when its content differs.
//! - [`FormatMode::Validate`] never leaves a file changed; each difference is
//!   reported through the [`Reporter`] error sink instead.
//!
//! A pass whose tool is not installed is reported and skipped.

mod house;
mod tools;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::consts::EXTERNAL_SENTINEL;
use crate::platform::ProjectDirs;
use crate::process::ProcessError;
use crate::report::Reporter;

pub use house::{normalize, run_house_format};
pub use tools::{run_clang_format, run_clang_tidy, run_eslint};

/// Extensions of the files the native passes operate on.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cxx", "cpp", "h", "hxx", "hpp", "inl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
  #[default]
  Fix,
  Validate,
}

impl FormatMode {
  pub fn from_validate(validate: bool) -> Self {
    if validate { Self::Validate } else { Self::Fix }
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
  pub mode: FormatMode,
  /// Also run the (slow) clang-tidy pass.
  pub tidy: bool,
}

#[derive(Debug, Error)]
pub enum FormatError {
  #[error("failed to traverse '{path}': {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to {action} '{path}': {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Process(#[from] ProcessError),
}

impl FormatError {
  pub(crate) fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.to_path_buf();
    move |source| Self::Io { action, path, source }
  }
}

/// Collect native source files under `libraries`, relative to it and sorted.
///
/// Files whose content starts with the external sentinel are vendored code and
/// are left alone.
pub fn gather_source_files(libraries: &Path) -> Result<Vec<PathBuf>, FormatError> {
  if !libraries.is_dir() {
    debug!(path = %libraries.display(), "no libraries directory, nothing to format");
    return Ok(Vec::new());
  }

  let mut files = Vec::new();
  for entry in WalkDir::new(libraries).sort_by_file_name() {
    let entry = entry.map_err(|source| FormatError::Walk {
      path: libraries.to_path_buf(),
      source,
    })?;
    if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
      continue;
    }

    let content = std::fs::read(entry.path()).map_err(FormatError::io("read", entry.path()))?;
    if content.starts_with(EXTERNAL_SENTINEL.as_bytes()) {
      debug!(path = %entry.path().display(), "skipping external source");
      continue;
    }

    let relative = entry.path().strip_prefix(libraries).unwrap_or(entry.path());
    files.push(relative.to_path_buf());
  }

  files.sort();
  Ok(files)
}

fn has_source_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Run every pass in order.
///
/// Only a failure to enumerate the source tree is returned; everything else
/// goes through `reporter`.
pub async fn format(dirs: &ProjectDirs, options: FormatOptions, reporter: &Reporter) -> Result<(), FormatError> {
  info!(mode = ?options.mode, tidy = options.tidy, "Formatting");

  run_eslint(dirs, options.mode, reporter).await;

  let files = gather_source_files(&dirs.libraries)?;
  info!(count = files.len(), "gathered source files");

  if options.tidy {
    run_clang_tidy(dirs, &files, options.mode, reporter).await;
  }
  run_clang_format(dirs, &files, options.mode, reporter).await;
  run_house_format(dirs, &files, options.mode, reporter).await;

  info!("Formatted");
  Ok(())
}

/// Compare freshly produced content against the file on disk and apply `mode`.
///
/// Returns whether the file differed.
pub(crate) async fn reconcile(
  path: &Path,
  old: &str,
  new: &str,
  pass: &str,
  mode: FormatMode,
  reporter: &Reporter,
) -> Result<bool, FormatError> {
  if old == new {
    return Ok(false);
  }

  match mode {
    FormatMode::Validate => reporter.error(&format!("File '{}' must be {pass}-formatted", path.display())),
    FormatMode::Fix => {
      debug!(path = %path.display(), pass, "rewriting");
      tokio::fs::write(path, new).await.map_err(FormatError::io("write", path))?;
    }
  }
  Ok(true)
}

/// Wait for every per-file task, reporting failures without cancelling siblings.
pub(crate) async fn join_file_tasks(mut join_set: JoinSet<(PathBuf, Result<bool, FormatError>)>, reporter: &Reporter) {
  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((_, Ok(_))) => {}
      Ok((path, Err(e))) => {
        error!(path = %path.display(), error = %e, "formatting failed");
        reporter.error(&e.to_string());
      }
      Err(e) => {
        error!(error = %e, "formatting task panicked");
        reporter.error(&format!("formatting task did not complete: {e}"));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::scaffold_project;
  use tempfile::TempDir;

  fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }

  #[test]
  fn gathers_only_native_sources_sorted() {
    let temp = TempDir::new().unwrap();
    let dirs = scaffold_project(temp.path());
    write(&dirs.libraries, "Zeta/Main.cpp", "int main() {}\n");
    write(&dirs.libraries, "Alpha/Types.hpp", "#pragma once\n");
    write(&dirs.libraries, "Alpha/Inline.inl", "\n");
    write(&dirs.libraries, "Alpha/Old.c", "\n");
    write(&dirs.libraries, "Alpha/CMakeLists.txt", "project(Alpha)\n");
    write(&dirs.libraries, "Alpha/script.js", "let a;\n");

    let files = gather_source_files(&dirs.libraries).unwrap();

    assert_eq!(
      files,
      vec![
        Path::new("Alpha").join("Inline.inl"),
        Path::new("Alpha").join("Old.c"),
        Path::new("Alpha").join("Types.hpp"),
        Path::new("Zeta").join("Main.cpp"),
      ]
    );
  }

  #[test]
  fn external_sources_are_excluded() {
    let temp = TempDir::new().unwrap();
    let dirs = scaffold_project(temp.path());
    write(&dirs.libraries, "Vendor/stb.h", "// External.\n// stb\n");
    write(&dirs.libraries, "Core/Mentions.h", "// MIT Licensed (see LICENSE.md).\n// External.\n");

    let files = gather_source_files(&dirs.libraries).unwrap();
    assert_eq!(files, vec![Path::new("Core").join("Mentions.h")]);
  }

  #[test]
  fn missing_libraries_dir_yields_nothing() {
    let temp = TempDir::new().unwrap();
    assert!(gather_source_files(&temp.path().join("Libraries")).unwrap().is_empty());
  }

  #[tokio::test]
  async fn reconcile_validate_reports_and_leaves_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a.cpp");
    std::fs::write(&path, "old").unwrap();
    let reporter = Reporter::new();

    let changed = reconcile(&path, "old", "new", "clang", FormatMode::Validate, &reporter)
      .await
      .unwrap();

    assert!(changed);
    assert!(reporter.has_failed());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
  }

  #[tokio::test]
  async fn reconcile_fix_rewrites_silently() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a.cpp");
    std::fs::write(&path, "old").unwrap();
    let reporter = Reporter::new();

    reconcile(&path, "old", "new", "clang", FormatMode::Fix, &reporter).await.unwrap();

    assert!(!reporter.has_failed());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
  }

  #[test]
  fn mode_follows_validate_flag() {
    assert_eq!(FormatMode::from_validate(true), FormatMode::Validate);
    assert_eq!(FormatMode::from_validate(false), FormatMode::Fix);
    assert_eq!(FormatOptions::default().mode, FormatMode::Fix);
  }
}
