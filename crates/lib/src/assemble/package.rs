//! Standalone package archives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{AssembleError, Archiver, EXECUTABLES, Executable, collect_join_results, remove_if_exists};
use crate::combo::Combo;
use crate::consts::VFS_ARCHIVE;
use crate::report::Reporter;

/// Extensions and exact names never shipped in a package.
pub const PACKAGE_DENY_LIST: &[&str] = &[
  ".pdb",
  ".ilk",
  ".exp",
  ".lib",
  ".wast",
  ".cmake",
  "CMakeFiles",
  VFS_ARCHIVE,
];

/// Whether a library output entry is build scratch rather than a deliverable.
pub fn is_denied(file_name: &str) -> bool {
  let extension = Path::new(file_name)
    .extension()
    .map(|ext| format!(".{}", ext.to_string_lossy()));

  PACKAGE_DENY_LIST
    .iter()
    .any(|denied| *denied == file_name || extension.as_deref() == Some(*denied))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlan {
  pub executable: &'static str,
  pub archive: PathBuf,
  /// VFS archive copied in as the package's starting point.
  pub seed: Option<PathBuf>,
  /// Absolute paths, so the archive records bare file names.
  pub files: Vec<PathBuf>,
}

/// Work out the package for `exe`, or `None` when it has no output directory.
pub fn plan_package(build_dir: &Path, exe: &Executable, combo: &Combo) -> Result<Option<PackagePlan>, AssembleError> {
  let library_dir = exe.library_dir(build_dir);
  if !library_dir.is_dir() {
    return Ok(None);
  }

  let mut files = Vec::new();
  for entry in std::fs::read_dir(&library_dir).map_err(AssembleError::io("read", &library_dir))? {
    let entry = entry.map_err(AssembleError::io("read", &library_dir))?;
    let name = entry.file_name();
    if is_denied(&name.to_string_lossy()) {
      debug!(file = %name.to_string_lossy(), "excluded from package");
      continue;
    }
    files.push(entry.path());
  }
  files.sort();

  // The WebAssembly target has no virtual filesystem
  let seed = (!combo.is_emscripten()).then(|| library_dir.join(VFS_ARCHIVE));

  Ok(Some(PackagePlan {
    executable: exe.name,
    archive: build_dir.join(format!("{}Package.zip", exe.name)),
    seed,
    files,
  }))
}

/// Build `exe`'s package archive. Returns `None` when the executable was skipped.
pub async fn assemble_package<A: Archiver>(
  build_dir: &Path,
  exe: &Executable,
  combo: &Combo,
  archiver: &A,
  reporter: &Reporter,
) -> Result<Option<PathBuf>, AssembleError> {
  info!(executable = exe.name, "packaging library");

  let Some(plan) = plan_package(build_dir, exe, combo)? else {
    let library_dir = exe.library_dir(build_dir);
    warn!(executable = exe.name, dir = %library_dir.display(), "library directory missing, skipping package");
    reporter.diagnostic(&format!("Library directory does not exist {}", library_dir.display()));
    return Ok(None);
  };

  remove_if_exists(&plan.archive)?;
  if let Some(seed) = &plan.seed {
    std::fs::copy(seed, &plan.archive).map_err(AssembleError::io("copy", seed))?;
  }

  if !plan.files.is_empty() {
    archiver.add(&plan.archive, &plan.files).await?;
  }
  Ok(Some(plan.archive))
}

/// Package every registered executable concurrently.
pub async fn assemble_packages<A: Archiver + 'static>(
  build_dir: &Path,
  combo: &Combo,
  archiver: Arc<A>,
  reporter: &Reporter,
) -> Vec<(&'static str, Result<Option<PathBuf>, AssembleError>)> {
  let mut join_set = JoinSet::new();
  let mut names = HashMap::new();

  for exe in EXECUTABLES {
    let build_dir = build_dir.to_path_buf();
    let combo = combo.clone();
    let archiver = archiver.clone();
    let reporter = reporter.clone();

    let handle = join_set.spawn(async move {
      let result = assemble_package(&build_dir, exe, &combo, archiver.as_ref(), &reporter).await;
      (exe.name, result)
    });
    names.insert(handle.id(), exe.name);
  }

  collect_join_results(join_set, names).await
}
