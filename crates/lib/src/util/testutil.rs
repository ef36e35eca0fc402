//! Test utilities for welder-lib.
//!
//! Cross-platform helpers for tests that need to spawn real processes.

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns a command that sleeps for `secs` seconds.
#[cfg(unix)]
pub fn shell_sleep(secs: u32) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), format!("sleep {}", secs)])
}

#[cfg(windows)]
pub fn shell_sleep(secs: u32) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("Start-Sleep -Seconds {}", secs),
    ],
  )
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  // Use PowerShell to create an empty file - more reliable than cmd.exe approaches
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

/// Lay out an empty project tree (root marker plus the fixed directories).
pub fn scaffold_project(root: &std::path::Path) -> crate::platform::ProjectDirs {
  std::fs::write(root.join(crate::consts::ROOT_MARKER), "").unwrap();
  let dirs = crate::platform::ProjectDirs::from_root(root);
  for dir in [&dirs.libraries, &dirs.resources, &dirs.build] {
    std::fs::create_dir_all(dir).unwrap();
  }
  dirs
}

/// Write an executable `/bin/sh` script named `name` into `bin`.
#[cfg(unix)]
pub fn install_script(bin: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
  use std::os::unix::fs::PermissionsExt;

  std::fs::create_dir_all(bin).unwrap();
  let path = bin.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// `PATH` with `bin` searched before everything else.
#[cfg(unix)]
pub fn path_with(bin: &std::path::Path) -> String {
  format!("{}:{}", bin.display(), std::env::var("PATH").unwrap_or_default())
}

/// [`Archiver`](crate::assemble::Archiver) that records its calls instead of compressing anything.
#[derive(Debug, Default)]
pub struct RecordingArchiver {
  calls: std::sync::Mutex<Vec<(std::path::PathBuf, Vec<std::path::PathBuf>)>>,
}

impl RecordingArchiver {
  pub fn calls(&self) -> Vec<(std::path::PathBuf, Vec<std::path::PathBuf>)> {
    self.calls.lock().unwrap().clone()
  }
}

impl crate::assemble::Archiver for RecordingArchiver {
  async fn add(
    &self,
    archive: &std::path::Path,
    files: &[std::path::PathBuf],
  ) -> Result<(), crate::assemble::AssembleError> {
    self
      .calls
      .lock()
      .unwrap()
      .push((archive.to_path_buf(), files.to_vec()));
    Ok(())
  }
}
