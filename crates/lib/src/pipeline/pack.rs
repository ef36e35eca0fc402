//! The `pack` stage: standalone package archives.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use super::Workspace;
use crate::assemble::{SEVEN_ZIP, SevenZip, assemble_packages};
use crate::combo::Combo;
use crate::process::require_tool;

/// Package every executable of the active combo. Returns the archives written.
pub async fn pack(ws: &Workspace, combo: &Combo) -> Vec<PathBuf> {
  info!(combo = %combo, "Packing");
  let reporter = &ws.reporter;

  if !require_tool(SEVEN_ZIP, reporter) {
    return Vec::new();
  }
  let Some(build_dir) = ws.activate(combo) else {
    return Vec::new();
  };

  let archiver = Arc::new(SevenZip::new(&ws.dirs.repo, reporter.clone()));
  let mut archives = Vec::new();
  for (executable, result) in assemble_packages(build_dir.path(), combo, archiver, reporter).await {
    match result {
      Ok(Some(archive)) => archives.push(archive),
      Ok(None) => {}
      Err(e) => {
        error!(executable, error = %e, "packaging failed");
        reporter.error(&e.to_string());
      }
    }
  }

  archives.sort();
  info!(count = archives.len(), "Packed");
  archives
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::combo::ComboOverrides;
  use crate::platform::HostOs;
  use crate::process::command_exists;
  use crate::report::Reporter;
  use crate::util::testutil::scaffold_project;
  use tempfile::TempDir;

  #[tokio::test]
  async fn nothing_built_means_nothing_packed() {
    let temp = TempDir::new().unwrap();
    let ws = Workspace::new(scaffold_project(temp.path()), HostOs::Linux, Reporter::new());
    let combo = ws.resolve_combo(Some("Linux"), &ComboOverrides::default());

    let archives = pack(&ws, &combo).await;

    assert!(archives.is_empty());
    // Missing library directories are warnings; only a missing archiver fails
    assert_eq!(ws.reporter.has_failed(), !command_exists(SEVEN_ZIP));
  }
}
