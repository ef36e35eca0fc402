//! Passes delegated to external formatters and linters.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{FormatError, FormatMode, join_file_tasks, reconcile};
use crate::platform::ProjectDirs;
use crate::process::{RunOptions, require_tool, run};
use crate::report::Reporter;

const ESLINT_SCRIPT: &str = "node_modules/eslint/bin/eslint.js";
const CLANG_TIDY: &str = "clang-tidy";
const CLANG_FORMAT: &str = "clang-format";

/// Lint the whole repository with the project-local eslint.
pub async fn run_eslint(dirs: &ProjectDirs, mode: FormatMode, reporter: &Reporter) {
  info!("Running Eslint");

  if !dirs.repo.join(ESLINT_SCRIPT).is_file() {
    reporter.log(&format!("Skipping eslint, '{ESLINT_SCRIPT}' is not installed"));
    return;
  }
  if !require_tool("node", reporter) {
    return;
  }

  let mut args = vec![ESLINT_SCRIPT, "."];
  let options = match mode {
    FormatMode::Fix => {
      args.push("--fix");
      RunOptions::new()
        .with_stdout(reporter.log_sink())
        .with_stderr(reporter.log_sink())
    }
    FormatMode::Validate => RunOptions::new()
      .with_stdout(reporter.diagnostic_sink())
      .with_stderr(reporter.diagnostic_sink()),
  }
  .in_dir(&dirs.repo);

  match run("node", &args, &options).await {
    Ok(output) if output.success() => {}
    Ok(output) => match mode {
      FormatMode::Validate => reporter.error(&format!("eslint reported problems (exit code {:?})", output.code())),
      FormatMode::Fix => reporter.log(&format!("eslint left unfixed problems (exit code {:?})", output.code())),
    },
    Err(e) => {
      warn!(error = %e, "eslint did not run");
      reporter.error(&e.to_string());
    }
  }
}

/// Run clang-tidy over each file in turn.
///
/// clang-tidy can only fix in place, so validation snapshots each file first
/// and puts the snapshot back when the tool changed it.
pub async fn run_clang_tidy(dirs: &ProjectDirs, files: &[PathBuf], mode: FormatMode, reporter: &Reporter) {
  info!("Running Clang Tidy");
  if !require_tool(CLANG_TIDY, reporter) {
    return;
  }

  for file in files {
    if let Err(e) = tidy_file(dirs, file, mode, reporter).await {
      warn!(file = %file.display(), error = %e, "clang-tidy failed");
      reporter.error(&e.to_string());
    }
  }
}

async fn tidy_file(dirs: &ProjectDirs, file: &Path, mode: FormatMode, reporter: &Reporter) -> Result<(), FormatError> {
  let path = dirs.libraries.join(file);
  let old = tokio::fs::read(&path).await.map_err(FormatError::io("read", &path))?;

  let args = [
    "-extra-arg=-Weverything".into(),
    "-fix".into(),
    "-header-filter=.*".into(),
    file.as_os_str().to_owned(),
  ];
  // Missing compile_commands.json chatter lands on stderr; diagnostics are on stdout
  let output = run(CLANG_TIDY, &args, &RunOptions::new().in_dir(&dirs.libraries)).await?;
  debug!(file = %file.display(), code = ?output.code(), "clang-tidy finished");

  if mode == FormatMode::Fix {
    return Ok(());
  }

  let new = tokio::fs::read(&path).await.map_err(FormatError::io("read", &path))?;
  if old != new {
    reporter.error(&format!("File '{}' must be clang-tidy-formatted", path.display()));
    reporter.error(&output.stdout);
    tokio::fs::write(&path, &old)
      .await
      .map_err(FormatError::io("restore", &path))?;
  }
  Ok(())
}

/// Compare clang-format's rendering of every file with the file on disk.
pub async fn run_clang_format(dirs: &ProjectDirs, files: &[PathBuf], mode: FormatMode, reporter: &Reporter) {
  info!("Running Clang Format");
  if !require_tool(CLANG_FORMAT, reporter) {
    return;
  }

  let mut join_set = JoinSet::new();
  for file in files {
    let file = file.clone();
    let libraries = dirs.libraries.clone();
    let reporter = reporter.clone();

    join_set.spawn(async move {
      let path = libraries.join(&file);
      let result = async {
        let output = run(CLANG_FORMAT, &[&file], &RunOptions::new().in_dir(&libraries)).await?;
        if !output.success() {
          // An empty rendering must never overwrite the file
          reporter.error(&format!("clang-format failed on '{}'", path.display()));
          reporter.error(&output.stderr);
          return Ok(false);
        }

        let old = tokio::fs::read_to_string(&path)
          .await
          .map_err(FormatError::io("read", &path))?;
        reconcile(&path, &old, &output.stdout, CLANG_FORMAT, mode, &reporter).await
      }
      .await;
      (path, result)
    });
  }

  join_file_tasks(join_set, reporter).await;
}
