//! The `cmake` stage: generate a fresh build directory for a combo.

use tracing::{error, info, warn};

use super::{CMAKE, Workspace};
use crate::activate::BuildDir;
use crate::combo::Combo;
use crate::process::{RunOptions, require_tool, run};
use crate::toolchain::{FlagContext, emscripten_root_from_env, synthesize};
use crate::version::VersionIdentity;

const GIT: &str = "git";

/// Configure `combo` from scratch.
///
/// 1. Check that cmake and git are installed
/// 2. Query git for the version identity (empty when git has no answer)
/// 3. Synthesize the generator arguments
/// 4. Activate the build directory, then wipe and recreate it
/// 5. Run the generator inside it
///
/// Returns the build directory once the generator has been run, whatever its
/// exit status. Anything that stops the stage earlier is reported.
pub async fn configure(ws: &Workspace, combo: &Combo) -> Option<BuildDir> {
  info!(combo = %combo, "Running CMake");
  let reporter = &ws.reporter;

  // Both are checked so a bare machine reports every missing tool at once
  let has_cmake = require_tool(CMAKE, reporter);
  let has_git = require_tool(GIT, reporter);
  if !has_cmake || !has_git {
    return None;
  }

  // A checkout without history still configures, with empty version variables
  let version = VersionIdentity::query(&ws.dirs.repo).await.unwrap_or_else(|e| {
    warn!(error = %e, "could not determine version identity");
    reporter.error(&e.to_string());
    VersionIdentity::default()
  });

  let emscripten_root = emscripten_root_from_env();
  let ctx = FlagContext {
    host: ws.host,
    version: &version,
    source_dir: &ws.dirs.repo,
    emscripten_root: emscripten_root.as_deref(),
  };
  let args = match synthesize(combo, &ctx) {
    Ok(args) => args,
    Err(e) => {
      error!(combo = %combo, error = %e, "cannot synthesize generator arguments");
      reporter.error(&e.to_string());
      return None;
    }
  };
  reporter.log(&args.join(" "));
  reporter.log(&combo.to_string());

  let build_dir = ws.activate(combo)?;
  if let Err(e) = recreate_dir(build_dir.path()) {
    error!(build_dir = %build_dir.path().display(), error = %e, "could not reset build directory");
    reporter.error(&format!("Could not reset {}: {e}", build_dir.path().display()));
    return None;
  }
  if let Err(e) = std::fs::create_dir_all(&ws.dirs.prebuilt_content) {
    reporter.error(&format!("Could not create {}: {e}", ws.dirs.prebuilt_content.display()));
  }

  let options = RunOptions::new()
    .in_dir(build_dir.path())
    .with_stdout(reporter.log_sink())
    .with_stderr(reporter.diagnostic_sink());

  match run(CMAKE, &args, &options).await {
    Ok(output) if output.success() => info!(build_dir = %build_dir.name, "configured"),
    Ok(output) => reporter.error(&format!("{CMAKE} exited with code {:?}", output.code())),
    Err(e) => reporter.error(&e.to_string()),
  }

  Some(build_dir)
}

fn recreate_dir(path: &std::path::Path) -> std::io::Result<()> {
  match std::fs::remove_dir_all(path) {
    Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
    _ => {}
  }
  std::fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::combo::ComboOverrides;
  use crate::consts::EMSCRIPTEN_ENV;
  use crate::platform::HostOs;
  use crate::report::Reporter;
  use crate::util::testutil::scaffold_project;
  use serial_test::serial;
  use tempfile::TempDir;

  #[test]
  fn recreating_discards_previous_contents() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("Build").join("X");
    std::fs::create_dir_all(dir.join("CMakeFiles")).unwrap();
    std::fs::write(dir.join("CMakeCache.txt"), "stale").unwrap();

    recreate_dir(&dir).unwrap();

    assert!(dir.is_dir());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
  }

  /// Stand-in `cmake` that records its arguments in the build directory.
  #[cfg(unix)]
  const RECORDING_CMAKE: &str = "echo \"$@\" > cmake-args.txt";

  #[tokio::test]
  #[serial]
  #[cfg(unix)]
  async fn unconfigurable_emscripten_creates_nothing() {
    use crate::util::testutil::{install_script, path_with};

    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("bin");
    install_script(&bin, CMAKE, RECORDING_CMAKE);
    install_script(&bin, GIT, "echo 1");
    let repo = temp.path().join("repo");
    std::fs::create_dir_all(&repo).unwrap();
    let ws = Workspace::new(scaffold_project(&repo), HostOs::Linux, Reporter::new());
    let combo = ws.resolve_combo(Some("Emscripten"), &ComboOverrides::default());

    // Tools and version are available, so only the missing toolchain root stops it
    let result = temp_env::async_with_vars(
      [(EMSCRIPTEN_ENV, None), ("PATH", Some(path_with(&bin)))],
      configure(&ws, &combo),
    )
    .await;

    assert!(result.is_none());
    assert!(ws.reporter.has_failed());
    assert_eq!(std::fs::read_dir(&ws.dirs.build).unwrap().count(), 0);
  }

  #[tokio::test]
  #[serial]
  #[cfg(unix)]
  async fn missing_git_history_still_runs_generator() {
    use crate::util::testutil::{install_script, path_with};

    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("bin");
    install_script(&bin, CMAKE, RECORDING_CMAKE);
    install_script(&bin, GIT, "echo 'fatal: not a git repository' >&2\nexit 128");
    let repo = temp.path().join("repo");
    std::fs::create_dir_all(&repo).unwrap();
    let ws = Workspace::new(scaffold_project(&repo), HostOs::Linux, Reporter::new());
    let combo = ws.resolve_combo(Some("Linux"), &ComboOverrides::default());

    let build_dir = temp_env::async_with_vars([("PATH", Some(path_with(&bin)))], configure(&ws, &combo))
      .await
      .unwrap();

    // The git failure is reported, the generator still sees empty version variables
    assert!(ws.reporter.has_failed());
    let args = std::fs::read_to_string(build_dir.path().join("cmake-args.txt")).unwrap();
    assert!(args.starts_with("-DWELDER_REVISION= -DWELDER_SHORT_CHANGESET= -DWELDER_CHANGESET="));
    assert!(args.contains("-DWELDER_TARGETOS=Linux"));
    assert!(ws.dirs.prebuilt_content.is_dir());
  }
}
