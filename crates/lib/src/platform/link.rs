//! Directory links.
//!
//! - **Unix**: standard symlinks via `std::os::unix::fs::symlink`
//! - **Windows**: directory symlinks, falling back to junctions (no elevation required)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(windows)]
use tracing::debug;

/// Create a directory link at `link` pointing to `target`.
///
/// A relative `target` is interpreted relative to the link's parent directory.
#[cfg(unix)]
pub fn link_dir(target: &Path, link: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub fn link_dir(target: &Path, link: &Path) -> io::Result<()> {
  if std::os::windows::fs::symlink_dir(target, link).is_ok() {
    return Ok(());
  }

  // Junctions need an absolute target
  let absolute_target = match (target.is_relative(), link.parent()) {
    (true, Some(parent)) => parent.join(target),
    _ => target.to_path_buf(),
  };
  let absolute_target = dunce::canonicalize(&absolute_target)?;

  debug!(target = %absolute_target.display(), link = %link.display(), "symlink failed, creating junction");
  junction::create(&absolute_target, link)
}

/// Read the target of a directory link.
///
/// Returns `None` if the path is not a link.
#[cfg(unix)]
pub fn read_dir_link(link: &Path) -> Option<PathBuf> {
  fs::read_link(link).ok()
}

#[cfg(windows)]
pub fn read_dir_link(link: &Path) -> Option<PathBuf> {
  if let Ok(target) = fs::read_link(link) {
    return Some(target);
  }
  junction::get_target(link).ok()
}

/// Remove a directory link if present. Returns whether anything was removed.
///
/// The link's target is never touched.
pub fn unlink_dir(link: &Path) -> io::Result<bool> {
  match fs::symlink_metadata(link) {
    Ok(_) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(e) => return Err(e),
  }

  #[cfg(windows)]
  {
    // Directory symlinks and junctions are removed like directories
    fs::remove_dir(link).or_else(|_| fs::remove_file(link))?;
  }

  #[cfg(not(windows))]
  {
    fs::remove_file(link)?;
  }

  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn relative_link_resolves_against_parent() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("target")).unwrap();
    std::fs::write(temp.path().join("target").join("file.txt"), "hi").unwrap();

    let link = temp.path().join("link");
    link_dir(Path::new("./target"), &link).unwrap();

    assert_eq!(std::fs::read_to_string(link.join("file.txt")).unwrap(), "hi");
    assert!(read_dir_link(&link).is_some());
  }

  #[test]
  fn unlink_leaves_target_intact() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    std::fs::create_dir(&target).unwrap();
    let link = temp.path().join("link");
    link_dir(&target, &link).unwrap();

    assert!(unlink_dir(&link).unwrap());
    assert!(!link.exists());
    assert!(target.is_dir());
  }

  #[test]
  fn unlink_missing_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    assert!(!unlink_dir(&temp.path().join("absent")).unwrap());
  }
}
