//! House normalisation pass.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tokio::task::JoinSet;
use tracing::info;

use super::{FormatError, FormatMode, join_file_tasks, reconcile};
use crate::consts::FILE_HEADER;
use crate::platform::ProjectDirs;
use crate::report::Reporter;

static LEADING_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[/*\-=\\]+.*").unwrap());

// Trailing text after the bar goes with it.
static DIVIDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[/*\-=\\]{40}.*").unwrap());

/// Normalise a source file to the house layout.
///
/// Comment lines at the top of the file are dropped, divider comments are
/// dropped wherever they appear, the canonical header becomes the first line
/// and line endings become `\n`.
pub fn normalize(text: &str) -> String {
  let lines: Vec<&str> = text
    .split('\n')
    .map(|line| line.strip_suffix('\r').unwrap_or(line))
    .collect();

  let body_start = lines
    .iter()
    .position(|line| !LEADING_COMMENT.is_match(line))
    .unwrap_or(lines.len());

  std::iter::once(FILE_HEADER)
    .chain(lines[body_start..].iter().copied().filter(|line| !DIVIDER.is_match(line)))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Apply [`normalize`] to every file concurrently.
pub async fn run_house_format(dirs: &ProjectDirs, files: &[PathBuf], mode: FormatMode, reporter: &Reporter) {
  info!("Running Welder Format");

  let mut join_set = JoinSet::new();
  for file in files {
    let path = dirs.libraries.join(file);
    let reporter = reporter.clone();

    join_set.spawn(async move {
      let result = async {
        let old = tokio::fs::read_to_string(&path).await.map_err(FormatError::io("read", &path))?;
        let new = normalize(&old);
        reconcile(&path, &old, &new, "welder", mode, &reporter).await
      }
      .await;
      (path, result)
    });
  }

  join_file_tasks(join_set, reporter).await;
}
