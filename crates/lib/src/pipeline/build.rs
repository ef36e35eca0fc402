//! The `build` stage: VFS archives, then compilation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::{CMAKE, Workspace};
use crate::assemble::{SEVEN_ZIP, SevenZip, assemble_all_vfs};
use crate::combo::Combo;
use crate::consts::HEARTBEAT_INTERVAL;
use crate::platform::HostOs;
use crate::process::{RunOptions, require_tool, run};
use crate::report::Reporter;
use crate::version::ContentVersion;

/// Configuration built when none is requested explicitly.
pub const DEFAULT_BUILD_CONFIG: &str = "Release";

const TEST_EXECUTABLE: &str = "ne";

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  /// Value for `--config`, `Release` when unset.
  pub config: Option<String>,
  pub target: Option<String>,
  pub parallel: Option<u32>,
}

impl BuildOptions {
  pub fn config(&self) -> &str {
    self.config.as_deref().unwrap_or(DEFAULT_BUILD_CONFIG)
  }

  /// Arguments for `cmake --build`, run from inside the build directory.
  pub fn cmake_args(&self) -> Vec<String> {
    let mut args = vec![
      "--build".to_string(),
      ".".to_string(),
      "--config".to_string(),
      self.config().to_string(),
    ];
    if let Some(target) = &self.target {
      args.extend(["--target".to_string(), target.clone()]);
    }
    if let Some(parallel) = self.parallel {
      args.extend(["--parallel".to_string(), parallel.to_string()]);
    }
    args
  }
}

/// Build the active combo. Returns the test executables that were produced.
pub async fn build(ws: &Workspace, combo: &Combo, options: &BuildOptions) -> Vec<PathBuf> {
  info!(combo = %combo, "Running Build");
  let reporter = &ws.reporter;

  if !require_tool(CMAKE, reporter) {
    return Vec::new();
  }
  let Some(build_dir) = ws.activate(combo) else {
    return Vec::new();
  };

  match ContentVersion::from_build_dir(build_dir.path()) {
    Ok(version) => {
      if require_tool(SEVEN_ZIP, reporter) {
        let archiver = Arc::new(SevenZip::new(&ws.dirs.repo, reporter.clone()));
        for (executable, result) in assemble_all_vfs(&ws.dirs, build_dir.path(), &version, archiver, reporter).await {
          if let Err(e) = result {
            error!(executable, error = %e, "vfs assembly failed");
            reporter.error(&e.to_string());
          }
        }
      }
    }
    Err(e) => {
      warn!(error = %e, "skipping virtual file systems");
      reporter.error(&e.to_string());
    }
  }

  let run_options = RunOptions::new()
    .in_dir(build_dir.path())
    .with_stdout(reporter.classifying_sink())
    .with_stderr(reporter.diagnostic_sink())
    .with_heartbeat(HEARTBEAT_INTERVAL);

  match run(CMAKE, &options.cmake_args(), &run_options).await {
    Ok(output) if output.success() => info!(build_dir = %build_dir.name, "built"),
    Ok(output) => reporter.error(&format!("{CMAKE} --build exited with code {:?}", output.code())),
    Err(e) => reporter.error(&e.to_string()),
  }

  mark_test_executables(build_dir.path(), options.config(), ws.host, reporter)
}

/// Make any produced test executables runnable and return their paths.
pub fn mark_test_executables(build_dir: &Path, config: &str, host: HostOs, reporter: &Reporter) -> Vec<PathBuf> {
  let file_name = format!("{TEST_EXECUTABLE}{}", host.exe_extension());
  let candidates = [build_dir.join(config).join(&file_name), build_dir.join(&file_name)];

  let mut found = Vec::new();
  for candidate in candidates {
    if !candidate.is_file() {
      continue;
    }
    if let Err(e) = make_executable(&candidate) {
      reporter.error(&format!("Could not mark {} executable: {e}", candidate.display()));
    }
    reporter.log(&format!("Test executable {}", candidate.display()));
    found.push(candidate);
  }
  found
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
  Ok(())
}
