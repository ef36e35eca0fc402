//! The `documentation` stage: one doxygen run per library.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::{error, info};

use super::Workspace;
use crate::process::{RunOptions, require_tool, run};
use crate::report::Reporter;

const DOXYGEN: &str = "doxygen";
const WARNINGS_LOG: &str = "warnings.log";

/// Doxygen configuration for one library: the shared Doxyfile plus overrides.
pub fn doxygen_input(doxyfile: &str, library_dir: &Path, output_dir: &Path) -> String {
  format!(
    "{doxyfile}\nINPUT=\"{}\"\nOUTPUT_DIRECTORY=\"{}\"\nWARN_LOGFILE=\"{}\"",
    library_dir.display(),
    output_dir.display(),
    output_dir.join(WARNINGS_LOG).display()
  )
}

/// Generate documentation for every library concurrently.
///
/// Returns the output directories of the runs that succeeded.
pub async fn documentation(ws: &Workspace) -> Vec<PathBuf> {
  info!("Running Doxygen");
  let reporter = &ws.reporter;

  if !require_tool(DOXYGEN, reporter) {
    return Vec::new();
  }

  let doxyfile_path = ws.dirs.doxyfile();
  let doxyfile = match std::fs::read_to_string(&doxyfile_path) {
    Ok(contents) => contents,
    Err(e) => {
      reporter.error(&format!("Could not read {}: {e}", doxyfile_path.display()));
      return Vec::new();
    }
  };

  let mut join_set = JoinSet::new();
  for library_dir in library_dirs(&ws.dirs.libraries) {
    let Some(name) = library_dir.file_name().map(|name| name.to_os_string()) else {
      continue;
    };
    let output_dir = ws.dirs.documentation_output().join(name);
    let input = doxygen_input(&doxyfile, &library_dir, &output_dir);
    let repo = ws.dirs.repo.clone();
    let reporter = reporter.clone();

    join_set.spawn(async move {
      let documented = document_library(&repo, &output_dir, input, &reporter).await;
      documented.then_some(output_dir)
    });
  }

  let mut generated = Vec::new();
  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok(Some(output_dir)) => generated.push(output_dir),
      Ok(None) => {}
      Err(e) => {
        error!(error = %e, "documentation task panicked");
        reporter.error(&format!("documentation task did not complete: {e}"));
      }
    }
  }
  generated.sort();
  generated
}

/// Direct subdirectories of `libraries`, sorted.
fn library_dirs(libraries: &Path) -> Vec<PathBuf> {
  let mut dirs: Vec<PathBuf> = std::fs::read_dir(libraries)
    .into_iter()
    .flatten()
    .flatten()
    .map(|entry| entry.path())
    .filter(|path| path.is_dir())
    .collect();
  dirs.sort();
  dirs
}

async fn document_library(repo: &Path, output_dir: &Path, input: String, reporter: &Reporter) -> bool {
  if let Err(e) = tokio::fs::create_dir_all(output_dir).await {
    reporter.error(&format!("Could not create {}: {e}", output_dir.display()));
    return false;
  }

  let options = RunOptions::new()
    .in_dir(repo)
    .with_stdin(input)
    .with_stdout(reporter.log_sink())
    .with_stderr(reporter.diagnostic_sink());
  match run(DOXYGEN, &["-"], &options).await {
    Ok(output) if output.success() => true,
    Ok(output) => {
      reporter.error(&format!("{DOXYGEN} exited with code {:?} for {}", output.code(), output_dir.display()));
      false
    }
    Err(e) => {
      reporter.error(&e.to_string());
      false
    }
  }
}
