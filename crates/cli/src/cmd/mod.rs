mod all;
mod build;
mod cmake;
mod documentation;
mod format;
mod info;
mod pack;
mod prebuilt;

pub use all::cmd_all;
pub use build::cmd_build;
pub use cmake::cmd_cmake;
pub use documentation::cmd_documentation;
pub use format::cmd_format;
pub use info::cmd_info;
pub use pack::cmd_pack;
pub use prebuilt::cmd_prebuilt;

use anyhow::{Context, Result};
use clap::Args;
use tokio::runtime::Runtime;

use welder_lib::combo::{Combo, ComboOverrides};
use welder_lib::pipeline::Workspace;
use welder_lib::report::Reporter;

/// Combo selection shared by every subcommand that works on a build directory.
#[derive(Args, Debug, Clone, Default)]
pub struct ComboArgs {
  /// Alias to start from: Empty, Emscripten, Linux or Windows (defaults to the host OS)
  #[arg(long)]
  pub alias: Option<String>,

  /// Override the target architecture
  #[arg(long)]
  pub architecture: Option<String>,

  /// Override the generator (e.g. Ninja)
  #[arg(long)]
  pub builder: Option<String>,

  /// Override the build configuration (e.g. Debug, Release)
  #[arg(long)]
  pub config: Option<String>,

  /// Override the platform layer
  #[arg(long)]
  pub platform: Option<String>,

  /// Override the target operating system
  #[arg(long)]
  pub targetos: Option<String>,

  /// Override the compiler toolchain
  #[arg(long)]
  pub toolchain: Option<String>,
}

impl ComboArgs {
  pub fn overrides(&self) -> ComboOverrides {
    ComboOverrides {
      architecture: self.architecture.clone(),
      builder: self.builder.clone(),
      config: self.config.clone(),
      platform: self.platform.clone(),
      targetos: self.targetos.clone(),
      toolchain: self.toolchain.clone(),
    }
  }

  pub fn resolve(&self, ws: &Workspace) -> Combo {
    ws.resolve_combo(self.alias.as_deref(), &self.overrides())
  }
}

fn workspace(reporter: &Reporter) -> Result<Workspace> {
  Workspace::discover(reporter.clone()).context("Failed to locate the project root")
}

fn runtime() -> Result<Runtime> {
  Runtime::new().context("Failed to create async runtime")
}
