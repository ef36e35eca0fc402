//! Virtual filesystem archives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use super::{AssembleError, Archiver, EXECUTABLES, Executable, collect_join_results, remove_if_exists};
use crate::consts::VFS_ARCHIVE;
use crate::platform::ProjectDirs;
use crate::report::Reporter;
use crate::version::ContentVersion;

/// Inputs of one VFS archive, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsPlan {
  pub executable: &'static str,
  pub archive: PathBuf,
  pub files: Vec<PathBuf>,
}

/// Work out what goes into `exe`'s VFS archive.
///
/// Every resource library contributes its live resources directory. Prebuilt
/// content for `version` is added on top when it exists; when it does not, the
/// library is simply shipped without it.
pub fn plan_vfs(
  dirs: &ProjectDirs,
  build_dir: &Path,
  exe: &Executable,
  version: &ContentVersion,
  reporter: &Reporter,
) -> VfsPlan {
  let prebuilt_root = dirs.prebuilt_content.join(version.prebuilt_dir_name());

  let mut files: Vec<PathBuf> = exe.additional_vfs.iter().map(|path| dirs.repo.join(path)).collect();
  for library in exe.resource_libraries {
    files.push(dirs.resources.join(library));

    let prebuilt = prebuilt_root.join(library);
    if prebuilt.exists() {
      files.push(prebuilt);
    } else {
      reporter.log(&format!("Skipping prebuilt content for {library}"));
    }
  }

  // Absolute paths would leak into the archive's entry names
  let files = files
    .into_iter()
    .map(|file| file.strip_prefix(&dirs.repo).map(Path::to_path_buf).unwrap_or(file))
    .collect();

  VfsPlan {
    executable: exe.name,
    archive: exe.library_dir(build_dir).join(VFS_ARCHIVE),
    files,
  }
}

/// Build `exe`'s VFS archive from scratch and return its path.
pub async fn assemble_vfs<A: Archiver>(
  dirs: &ProjectDirs,
  build_dir: &Path,
  exe: &Executable,
  version: &ContentVersion,
  archiver: &A,
  reporter: &Reporter,
) -> Result<PathBuf, AssembleError> {
  info!(executable = exe.name, "zipping virtual file system");

  let library_dir = exe.library_dir(build_dir);
  std::fs::create_dir_all(&library_dir).map_err(AssembleError::io("create", &library_dir))?;

  let plan = plan_vfs(dirs, build_dir, exe, version, reporter);
  remove_if_exists(&plan.archive)?;

  debug!(archive = %plan.archive.display(), files = ?plan.files, "adding vfs entries");
  archiver.add(&plan.archive, &plan.files).await?;
  Ok(plan.archive)
}

/// Assemble every registered executable's VFS concurrently.
///
/// All tasks run to completion; results are returned in completion order.
pub async fn assemble_all_vfs<A: Archiver + 'static>(
  dirs: &ProjectDirs,
  build_dir: &Path,
  version: &ContentVersion,
  archiver: Arc<A>,
  reporter: &Reporter,
) -> Vec<(&'static str, Result<PathBuf, AssembleError>)> {
  let mut join_set = JoinSet::new();
  let mut names = HashMap::new();

  for exe in EXECUTABLES {
    let dirs = dirs.clone();
    let build_dir = build_dir.to_path_buf();
    let version = version.clone();
    let archiver = archiver.clone();
    let reporter = reporter.clone();

    let handle = join_set.spawn(async move {
      let result = assemble_vfs(&dirs, &build_dir, exe, &version, archiver.as_ref(), &reporter).await;
      (exe.name, result)
    });
    names.insert(handle.id(), exe.name);
  }

  collect_join_results(join_set, names).await
}
