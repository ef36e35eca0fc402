//! Log and error sinks shared by every stage.
//!
//! Stages never unwind on tool failures; they describe problems through a
//! [`Reporter`]. Anything sent to [`Reporter::error`] marks the invocation as
//! failed, which the binary turns into a non-zero exit status.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

/// Callback receiving one line of tool output at a time.
pub type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

const INDENT: &str = "        ";

#[derive(Debug, Clone, Default)]
pub struct Reporter {
  failed: Arc<AtomicBool>,
}

impl Reporter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Emit informational text, one event per non-empty line.
  pub fn log(&self, text: &str) {
    for line in lines(text) {
      info!("{INDENT}+ {line}");
    }
  }

  /// Emit text styled as an error without affecting the exit status.
  ///
  /// Used for output that merely looks like a failure (compiler diagnostics,
  /// stderr chatter); the tool's exit status stays authoritative.
  pub fn diagnostic(&self, text: &str) {
    for line in lines(text) {
      warn!("{INDENT}- {line}");
    }
  }

  /// Emit an error and mark the invocation as failed.
  pub fn error(&self, text: &str) {
    for line in lines(text) {
      error!("{INDENT}- {line}");
    }
    self.failed.store(true, Ordering::SeqCst);
  }

  pub fn has_failed(&self) -> bool {
    self.failed.load(Ordering::SeqCst)
  }

  pub fn log_sink(&self) -> LineSink {
    let reporter = self.clone();
    Arc::new(move |line| reporter.log(line))
  }

  pub fn diagnostic_sink(&self) -> LineSink {
    let reporter = self.clone();
    Arc::new(move |line| reporter.diagnostic(line))
  }

  /// Sink that classifies each line: lines mentioning a failure are shown as
  /// diagnostics, the rest as log output.
  pub fn classifying_sink(&self) -> LineSink {
    let reporter = self.clone();
    Arc::new(move |line| {
      if looks_like_failure(line) {
        reporter.diagnostic(line);
      } else {
        reporter.log(line);
      }
    })
  }
}

/// Best-effort keyword scan used only for presentation.
pub fn looks_like_failure(line: &str) -> bool {
  ["FAILED", "failed", "ERROR"].iter().any(|keyword| line.contains(keyword))
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
  text.split(['\r', '\n']).filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tracing_test::traced_test;

  #[test]
  fn only_error_marks_failure() {
    let reporter = Reporter::new();
    reporter.log("fine");
    reporter.diagnostic("error: looks bad");
    assert!(!reporter.has_failed());

    reporter.error("really bad");
    assert!(reporter.has_failed());
  }

  #[test]
  fn clones_share_failure_state() {
    let reporter = Reporter::new();
    let sink_owner = reporter.clone();
    sink_owner.error("boom");
    assert!(reporter.has_failed());
  }

  #[test]
  #[traced_test]
  fn multiline_text_is_indented_per_line() {
    let reporter = Reporter::new();
    reporter.log("first\r\nsecond\n\n");
    assert!(logs_contain("        + first"));
    assert!(logs_contain("        + second"));
  }

  #[test]
  fn failure_keywords_are_case_sensitive() {
    assert!(looks_like_failure("FAILED: foo.o"));
    assert!(looks_like_failure("build failed"));
    assert!(looks_like_failure("ERROR in module"));
    assert!(!looks_like_failure("Error count: 0"));
    assert!(!looks_like_failure("[3/10] Building CXX object"));
  }
}
