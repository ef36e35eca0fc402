//! Artifact assembly.
//!
//! Two phases per executable:
//! - **VFS**: bundle the executable's resource libraries (live, plus prebuilt
//!   content for the current revision when present) and additional paths into
//!   `<build>/Libraries/<name>/FileSystem.zip`.
//! - **Package**: seed `<build>/<name>Package.zip` with the VFS archive and
//!   append every library output file that is not build scratch.
//!
//! Compression is delegated to an [`Archiver`]; [`SevenZip`] drives `7z`.

pub mod package;
pub mod vfs;

use std::collections::HashMap;
use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::{Id, JoinSet};
use tracing::error;

use crate::consts::{LIBRARIES_DIR, ROOT_MARKER};
use crate::process::{ProcessError, RunOptions, run};
use crate::report::Reporter;

pub use package::{PackagePlan, assemble_package, assemble_packages, is_denied, plan_package};
pub use vfs::{VfsPlan, assemble_all_vfs, assemble_vfs, plan_vfs};

pub const SEVEN_ZIP: &str = "7z";

#[derive(Debug, Error)]
pub enum AssembleError {
  #[error("failed to {action} '{path}': {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to run archiver for '{archive}': {source}")]
  Archiver {
    archive: PathBuf,
    #[source]
    source: ProcessError,
  },

  #[error("archiver exited with code {code:?} while writing '{archive}'")]
  ArchiveFailed { archive: PathBuf, code: Option<i32> },

  #[error("assembly task for {executable} did not complete: {message}")]
  Task { executable: String, message: String },
}

impl AssembleError {
  pub(crate) fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
    let path = path.to_path_buf();
    move |source| Self::Io { action, path, source }
  }
}

/// A build target whose runtime resources ship in a virtual filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executable {
  pub name: &'static str,
  /// Directories under `Resources/` (and the prebuilt content root).
  pub resource_libraries: &'static [&'static str],
  /// Paths relative to the project root, included verbatim.
  pub additional_vfs: &'static [&'static str],
}

impl Executable {
  /// Output directory of this executable inside a build directory.
  pub fn library_dir(&self, build_dir: &Path) -> PathBuf {
    build_dir.join(LIBRARIES_DIR).join(self.name)
  }
}

pub const EXECUTABLES: &[Executable] = &[
  Executable {
    name: "WelderEditor",
    resource_libraries: &["FragmentCore", "Loading", "ZeroCore", "UiWidget", "EditorUi", "Editor"],
    additional_vfs: &["Data", ROOT_MARKER],
  },
  Executable {
    name: "WelderLauncher",
    resource_libraries: &["FragmentCore", "Loading", "ZeroCore", "ZeroLauncherResources"],
    additional_vfs: &["Data", ROOT_MARKER],
  },
  Executable {
    name: "WelderLauncherShell",
    resource_libraries: &[],
    additional_vfs: &[ROOT_MARKER],
  },
];

pub fn find_executable(name: &str) -> Option<&'static Executable> {
  EXECUTABLES.iter().find(|exe| exe.name == name)
}

/// Appends files to a zip archive, creating it if needed.
///
/// Relative inputs keep their relative path inside the archive; absolute
/// inputs contribute only their file name.
pub trait Archiver: Send + Sync {
  fn add(&self, archive: &Path, files: &[PathBuf]) -> impl Future<Output = Result<(), AssembleError>> + Send;
}

/// [`Archiver`] backed by the `7z` command line tool, run from the project root.
#[derive(Debug, Clone)]
pub struct SevenZip {
  repo: PathBuf,
  reporter: Reporter,
}

impl SevenZip {
  pub fn new(repo: impl Into<PathBuf>, reporter: Reporter) -> Self {
    Self {
      repo: repo.into(),
      reporter,
    }
  }
}

impl Archiver for SevenZip {
  async fn add(&self, archive: &Path, files: &[PathBuf]) -> Result<(), AssembleError> {
    let mut args: Vec<OsString> = ["a", "-tzip", "-mx=9", "-mfb=128", "-mpass=10"]
      .into_iter()
      .map(OsString::from)
      .collect();
    args.push(archive.as_os_str().to_owned());
    args.extend(files.iter().map(|file| file.as_os_str().to_owned()));

    let options = RunOptions::new()
      .in_dir(&self.repo)
      .with_stdout(self.reporter.log_sink())
      .with_stderr(self.reporter.diagnostic_sink());

    let output = run(SEVEN_ZIP, &args, &options)
      .await
      .map_err(|source| AssembleError::Archiver {
        archive: archive.to_path_buf(),
        source,
      })?;

    if !output.success() {
      return Err(AssembleError::ArchiveFailed {
        archive: archive.to_path_buf(),
        code: output.code(),
      });
    }
    Ok(())
  }
}

/// Delete `path`, treating absence as success.
pub(crate) fn remove_if_exists(path: &Path) -> Result<(), AssembleError> {
  match std::fs::remove_file(path) {
    Err(e) if e.kind() != io::ErrorKind::NotFound => Err(AssembleError::io("remove", path)(e)),
    _ => Ok(()),
  }
}

/// Join every assembly task, converting panics into [`AssembleError::Task`].
pub(crate) async fn collect_join_results<T: 'static>(
  mut join_set: JoinSet<(&'static str, Result<T, AssembleError>)>,
  names: HashMap<Id, &'static str>,
) -> Vec<(&'static str, Result<T, AssembleError>)> {
  let mut results = Vec::new();

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok(result) => results.push(result),
      Err(e) => {
        let executable = names.get(&e.id()).copied().unwrap_or("unknown");
        error!(executable, error = %e, "assembly task panicked");
        results.push((
          executable,
          Err(AssembleError::Task {
            executable: executable.to_string(),
            message: e.to_string(),
          }),
        ));
      }
    }
  }

  results
}
