//! The `prebuilt` stage: let the editor export prebuilt content.

use std::path::Path;

use tracing::{info, warn};

use super::Workspace;
use crate::assemble::find_executable;
use crate::combo::Combo;
use crate::process::{RunOptions, run};

const EDITOR: &str = "WelderEditor";
const EDITOR_ARGS: &[&str] = &["-CopyPrebuiltContent", "-Exit"];

/// Run the built editor to populate `Build/PrebuiltContent`.
pub async fn prebuilt(ws: &Workspace, combo: &Combo) {
  info!(combo = %combo, "Copying Prebuilt Content");
  let reporter = &ws.reporter;

  if combo.is_emscripten() {
    reporter.log(&format!("Skipping prebuilt content for toolchain '{}'", combo.toolchain));
    return;
  }
  let Some(build_dir) = ws.activate(combo) else {
    return;
  };
  let Some(editor) = find_executable(EDITOR) else {
    return;
  };

  let editor_path = editor
    .library_dir(build_dir.path())
    .join(format!("{EDITOR}{}", ws.host.exe_extension()));
  if !editor_path.is_file() {
    warn!(path = %editor_path.display(), "editor was not built");
    reporter.diagnostic(&format!("Executable does not exist {}", editor_path.display()));
    return;
  }

  let options = RunOptions::new()
    .in_dir(build_dir.path())
    .with_stdout(reporter.log_sink())
    .with_stderr(reporter.diagnostic_sink());
  match run(&editor_path.to_string_lossy(), EDITOR_ARGS, &options).await {
    Ok(output) if !output.success() => {
      reporter.error(&format!("{EDITOR} exited with code {:?}", output.code()));
    }
    Ok(_) => {}
    Err(e) => reporter.error(&e.to_string()),
  }

  if !has_entries(&ws.dirs.prebuilt_content) {
    reporter.error("Prebuilt content directory did not exist or was empty");
    return;
  }
  info!("Copied Prebuilt Content");
}

fn has_entries(dir: &Path) -> bool {
  std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::combo::ComboOverrides;
  use crate::platform::HostOs;
  use crate::report::Reporter;
  use crate::util::testutil::scaffold_project;
  use tempfile::TempDir;

  fn workspace(temp: &TempDir) -> Workspace {
    Workspace::new(scaffold_project(temp.path()), HostOs::Linux, Reporter::new())
  }

  #[tokio::test]
  async fn emscripten_is_skipped_without_activation() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let combo = ws.resolve_combo(Some("Emscripten"), &ComboOverrides::default());

    prebuilt(&ws, &combo).await;

    assert!(!ws.reporter.has_failed());
    assert_eq!(std::fs::read_dir(&ws.dirs.build).unwrap().count(), 0);
  }

  #[tokio::test]
  async fn missing_editor_is_a_warning() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let combo = ws.resolve_combo(Some("Linux"), &ComboOverrides::default());

    prebuilt(&ws, &combo).await;

    assert!(!ws.reporter.has_failed());
  }

  #[cfg(unix)]
  async fn run_with_fake_editor(temp: &TempDir, script: &str) -> Workspace {
    use crate::activate::build_dir_name;
    use std::os::unix::fs::PermissionsExt;

    let ws = workspace(temp);
    let combo = ws.resolve_combo(Some("Linux"), &ComboOverrides::default());

    let library_dir = find_executable(EDITOR)
      .unwrap()
      .library_dir(&ws.dirs.build.join(build_dir_name(HostOs::Linux, &combo)));
    std::fs::create_dir_all(&library_dir).unwrap();
    let editor = library_dir.join(EDITOR);
    std::fs::write(&editor, format!("#!/bin/sh\n{script}\n")).unwrap();
    std::fs::set_permissions(&editor, std::fs::Permissions::from_mode(0o755)).unwrap();

    prebuilt(&ws, &combo).await;
    ws
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn editor_output_satisfies_the_check() {
    // The editor runs inside the build directory
    let temp = TempDir::new().unwrap();
    let ws = run_with_fake_editor(&temp, "mkdir -p ../PrebuiltContent/Version-1-abc").await;

    assert!(!ws.reporter.has_failed());
    assert!(ws.dirs.prebuilt_content.join("Version-1-abc").is_dir());
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn empty_prebuilt_content_is_an_error() {
    let temp = TempDir::new().unwrap();
    let ws = run_with_fake_editor(&temp, "exit 0").await;

    assert!(ws.reporter.has_failed());
  }
}
