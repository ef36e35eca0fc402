//! External command façade.
//!
//! Every external tool (generator, compiler driver, formatter, archiver, git)
//! goes through [`run`]. Output is read incrementally, forwarded line by line
//! to optional sinks for live progress, and accumulated verbatim into the
//! returned [`RunOutput`]. A non-zero exit is not an error unless the caller
//! asks for it with [`RunOptions::checked`].

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::consts::HEARTBEAT_LINE;
use crate::report::{LineSink, Reporter};

#[derive(Debug, Error)]
pub enum ProcessError {
  /// The program could not be started (usually: not installed).
  #[error("failed to spawn '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to write stdin of '{program}': {source}")]
  Stdin {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("failed while waiting for '{program}': {source}")]
  Wait {
    program: String,
    #[source]
    source: io::Error,
  },

  /// Only produced when the run was configured with [`RunOptions::checked`].
  #[error("'{program}' exited with code {code:?}")]
  Failed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },
}

/// How to run an external command.
#[derive(Clone, Default)]
pub struct RunOptions {
  pub cwd: Option<PathBuf>,
  /// Text written to the child's stdin, which is then closed.
  pub stdin: Option<String>,
  pub on_stdout: Option<LineSink>,
  pub on_stderr: Option<LineSink>,
  /// Emit a synthetic progress line on this period while the child runs.
  pub heartbeat: Option<Duration>,
  /// Turn a non-zero exit into [`ProcessError::Failed`].
  pub check: bool,
}

impl RunOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn in_dir(mut self, cwd: impl AsRef<Path>) -> Self {
    self.cwd = Some(cwd.as_ref().to_path_buf());
    self
  }

  pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
    self.stdin = Some(input.into());
    self
  }

  pub fn with_stdout(mut self, sink: LineSink) -> Self {
    self.on_stdout = Some(sink);
    self
  }

  pub fn with_stderr(mut self, sink: LineSink) -> Self {
    self.on_stderr = Some(sink);
    self
  }

  pub fn with_heartbeat(mut self, period: Duration) -> Self {
    self.heartbeat = Some(period);
    self
  }

  pub fn checked(mut self) -> Self {
    self.check = true;
    self
  }
}

/// Captured result of a completed command.
#[derive(Debug, Clone)]
pub struct RunOutput {
  pub stdout: String,
  pub stderr: String,
  pub status: ExitStatus,
}

impl RunOutput {
  pub fn success(&self) -> bool {
    self.status.success()
  }

  pub fn code(&self) -> Option<i32> {
    self.status.code()
  }

  pub fn stdout_trimmed(&self) -> &str {
    self.stdout.trim()
  }
}

/// Returns whether `program` can be found on `PATH`.
pub fn command_exists(program: &str) -> bool {
  which::which(program).is_ok()
}

/// Like [`command_exists`], but reports a missing tool as an error.
pub fn require_tool(program: &str, reporter: &Reporter) -> bool {
  if command_exists(program) {
    return true;
  }
  warn!(program, "required tool not found on PATH");
  reporter.error(&format!("Command '{program}' does not exist"));
  false
}

/// Run `program` to completion.
///
/// Always waits for the child to exit, including when it fails. The heartbeat,
/// if any, stops as soon as the child exits.
pub async fn run<S: AsRef<OsStr>>(program: &str, args: &[S], options: &RunOptions) -> Result<RunOutput, ProcessError> {
  let display_args: Vec<_> = args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()).collect();
  debug!(program = %program, args = ?display_args, cwd = ?options.cwd, "spawning process");

  let mut command = Command::new(program);
  command
    .args(args)
    .stdin(if options.stdin.is_some() {
      Stdio::piped()
    } else {
      Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

  if let Some(cwd) = &options.cwd {
    command.current_dir(cwd);
  }

  let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
    program: program.to_string(),
    source,
  })?;

  let stdout_task = spawn_reader(child.stdout.take(), options.on_stdout.clone());
  let stderr_task = spawn_reader(child.stderr.take(), options.on_stderr.clone());

  if let (Some(input), Some(mut stdin)) = (&options.stdin, child.stdin.take()) {
    match stdin.write_all(input.as_bytes()).await {
      Ok(()) => {}
      // The child may legitimately exit before consuming everything
      Err(e) if e.kind() == io::ErrorKind::BrokenPipe => debug!(program = %program, "stdin closed early"),
      Err(source) => {
        abandon(&mut child, [stdout_task, stderr_task]).await;
        return Err(ProcessError::Stdin {
          program: program.to_string(),
          source,
        });
      }
    }
  }

  let wait_err = |source| ProcessError::Wait {
    program: program.to_string(),
    source,
  };

  let status = wait_with_heartbeat(&mut child, options).await.map_err(wait_err)?;
  let stdout = join_reader(stdout_task).await.map_err(wait_err)?;
  let stderr = join_reader(stderr_task).await.map_err(wait_err)?;

  debug!(program = %program, code = ?status.code(), "process exited");

  if options.check && !status.success() {
    return Err(ProcessError::Failed {
      program: program.to_string(),
      code: status.code(),
      stderr,
    });
  }

  Ok(RunOutput { stdout, stderr, status })
}

async fn wait_with_heartbeat(child: &mut Child, options: &RunOptions) -> io::Result<ExitStatus> {
  let Some(period) = options.heartbeat else {
    return child.wait().await;
  };

  let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
  let wait = child.wait();
  tokio::pin!(wait);

  loop {
    tokio::select! {
      status = &mut wait => return status,
      _ = ticker.tick() => match &options.on_stdout {
        Some(sink) => sink(HEARTBEAT_LINE),
        None => info!("{HEARTBEAT_LINE}"),
      },
    }
  }
}

/// Kill `child` and stop reading its output once nothing more will be collected.
async fn abandon(child: &mut Child, readers: [JoinHandle<io::Result<String>>; 2]) {
  if let Err(e) = child.kill().await {
    debug!(error = %e, "could not kill child process");
  }
  for reader in readers {
    reader.abort();
  }
}

fn spawn_reader<R>(stream: Option<R>, sink: Option<LineSink>) -> JoinHandle<io::Result<String>>
where
  R: AsyncRead + Unpin + Send + 'static,
{
  tokio::spawn(async move {
    let Some(stream) = stream else {
      return Ok(String::new());
    };

    let mut reader = BufReader::new(stream);
    let mut collected = Vec::new();
    let mut line = Vec::new();

    loop {
      line.clear();
      if reader.read_until(b'\n', &mut line).await? == 0 {
        break;
      }
      if let Some(sink) = &sink {
        let text = String::from_utf8_lossy(&line);
        sink(text.trim_end_matches(['\r', '\n']));
      }
      collected.extend_from_slice(&line);
    }

    Ok(String::from_utf8_lossy(&collected).into_owned())
  })
}

async fn join_reader(task: JoinHandle<io::Result<String>>) -> io::Result<String> {
  task.await.map_err(io::Error::other)?
}
