//! Stage orchestration for the `welder` subcommands.
//!
//! Each stage takes a [`Workspace`] (project layout, host, reporter) and,
//! where relevant, the resolved [`Combo`]. Stages never fail with an error:
//! missing tools, mismatches and missing artifacts are reported through the
//! workspace's [`Reporter`] and the stage returns whatever it managed to
//! produce. The binary decides the exit status from [`Reporter::has_failed`].
//!
//! [`all`] runs every stage in order:
//!
//! 1. `format --validate`
//! 2. `cmake` ([`configure`])
//! 3. [`build`]
//! 4. [`prebuilt`]
//! 5. [`documentation`]
//! 6. [`pack`]

mod build;
mod configure;
mod documentation;
mod pack;
mod prebuilt;

use tracing::{error, info};

use crate::activate::{BuildDir, activate};
use crate::combo::{Combo, ComboOverrides, resolve};
use crate::format::{FormatMode, FormatOptions, format};
use crate::platform::paths::PathsError;
use crate::platform::{HostOs, ProjectDirs};
use crate::report::Reporter;

pub use build::{BuildOptions, DEFAULT_BUILD_CONFIG, build, mark_test_executables};
pub use configure::configure;
pub use documentation::{documentation, doxygen_input};
pub use pack::pack;
pub use prebuilt::prebuilt;

pub(crate) const CMAKE: &str = "cmake";

/// Everything a stage needs besides its own options.
#[derive(Debug, Clone)]
pub struct Workspace {
  pub dirs: ProjectDirs,
  pub host: HostOs,
  pub reporter: Reporter,
}

impl Workspace {
  pub fn new(dirs: ProjectDirs, host: HostOs, reporter: Reporter) -> Self {
    Self { dirs, host, reporter }
  }

  /// Locate the project for the running host.
  pub fn discover(reporter: Reporter) -> Result<Self, PathsError> {
    Ok(Self::new(ProjectDirs::discover()?, HostOs::current(), reporter))
  }

  pub fn resolve_combo(&self, alias: Option<&str>, overrides: &ComboOverrides) -> Combo {
    resolve(alias, overrides, self.host, &self.reporter)
  }

  /// Activate `combo`'s build directory, reporting a failure to create it.
  pub(crate) fn activate(&self, combo: &Combo) -> Option<BuildDir> {
    match activate(&self.dirs, self.host, combo, &self.reporter) {
      Ok(build_dir) => Some(build_dir),
      Err(e) => {
        error!(combo = %combo, error = %e, "activation failed");
        self.reporter.error(&e.to_string());
        None
      }
    }
  }
}

/// The `format` stage.
pub async fn run_format(ws: &Workspace, options: FormatOptions) {
  if let Err(e) = format(&ws.dirs, options, &ws.reporter).await {
    error!(error = %e, "formatting aborted");
    ws.reporter.error(&e.to_string());
  }
}

#[derive(Debug, Clone, Default)]
pub struct AllOptions {
  pub build: BuildOptions,
  /// Include clang-tidy in the validation pass.
  pub tidy: bool,
}

/// Run every stage in order without short-circuiting on reported errors.
pub async fn all(ws: &Workspace, combo: &Combo, options: &AllOptions) {
  info!(combo = %combo, "running all stages");

  run_format(
    ws,
    FormatOptions {
      mode: FormatMode::Validate,
      tidy: options.tidy,
    },
  )
  .await;
  configure(ws, combo).await;
  build(ws, combo, &options.build).await;
  prebuilt(ws, combo).await;
  documentation(ws).await;
  pack(ws, combo).await;
}
