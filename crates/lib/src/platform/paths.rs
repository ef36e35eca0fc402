//! Project directory layout.
//!
//! ```text
//! <repo>/
//!   .welder                  # root marker
//!   Libraries/               # native sources, one directory per library
//!   Resources/               # live resource libraries
//!   Documentation/Doxyfile
//!   Build/
//!     Active -> ./<combo>    # most recently activated build
//!     <combo>/               # one directory per build directory name
//!     PrebuiltContent/Version-<rev>-<changeset>/<resource library>/
//!     Documentation/<library>/
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{
  ACTIVE_LINK, BUILD_DIR, DOCUMENTATION_DIR, DOXYFILE, LIBRARIES_DIR, PREBUILT_CONTENT_DIR, RESOURCES_DIR, ROOT_ENV,
  ROOT_MARKER,
};

#[derive(Debug, Error)]
pub enum PathsError {
  #[error("could not find '{marker}' in {start} or any parent directory")]
  RootNotFound { marker: &'static str, start: PathBuf },

  #[error("failed to read current directory: {0}")]
  CurrentDir(#[source] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDirs {
  pub repo: PathBuf,
  pub libraries: PathBuf,
  pub resources: PathBuf,
  pub build: PathBuf,
  pub prebuilt_content: PathBuf,
}

impl ProjectDirs {
  /// Derive every project directory from the repository root.
  pub fn from_root(repo: impl Into<PathBuf>) -> Self {
    let repo = repo.into();
    let build = repo.join(BUILD_DIR);
    Self {
      libraries: repo.join(LIBRARIES_DIR),
      resources: repo.join(RESOURCES_DIR),
      prebuilt_content: build.join(PREBUILT_CONTENT_DIR),
      build,
      repo,
    }
  }

  /// Locate the project from `WELDER_ROOT`, falling back to the current directory.
  pub fn discover() -> Result<Self, PathsError> {
    if let Ok(root) = std::env::var(ROOT_ENV) {
      debug!(root = %root, "using project root from environment");
      return Ok(Self::from_root(canonical(PathBuf::from(root))));
    }

    let cwd = std::env::current_dir().map_err(PathsError::CurrentDir)?;
    Self::discover_from(&cwd)
  }

  /// Walk up from `start` to the nearest directory containing the root marker.
  pub fn discover_from(start: &Path) -> Result<Self, PathsError> {
    find_root(start)
      .map(|root| Self::from_root(canonical(root)))
      .ok_or_else(|| PathsError::RootNotFound {
        marker: ROOT_MARKER,
        start: start.to_path_buf(),
      })
  }

  pub fn active_link(&self) -> PathBuf {
    self.build.join(ACTIVE_LINK)
  }

  pub fn doxyfile(&self) -> PathBuf {
    self.repo.join(DOCUMENTATION_DIR).join(DOXYFILE)
  }

  /// Output root for generated documentation.
  pub fn documentation_output(&self) -> PathBuf {
    self.build.join(DOCUMENTATION_DIR)
  }
}

/// Returns the nearest ancestor of `start` (inclusive) holding the root marker.
pub fn find_root(start: &Path) -> Option<PathBuf> {
  start
    .ancestors()
    .find(|dir| dir.join(ROOT_MARKER).is_file())
    .map(Path::to_path_buf)
}

fn canonical(path: PathBuf) -> PathBuf {
  dunce::canonicalize(&path).unwrap_or(path)
}
