mod cmd;
mod output;

use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use welder_lib::report::Reporter;

use cmd::{ComboArgs, cmd_all, cmd_build, cmd_cmake, cmd_documentation, cmd_format, cmd_info, cmd_pack, cmd_prebuilt};
use output::{OutputFormat, format_duration, print_error};

/// welder - build orchestration for the Welder engine
#[derive(Parser)]
#[command(name = "welder")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Format all C/C++ sources (and lint scripts)
  Format {
    /// Report files that need formatting instead of rewriting them
    #[arg(long)]
    validate: bool,

    /// Also run clang-tidy (slow)
    #[arg(long)]
    tidy: bool,
  },

  /// Generate a fresh cmake project for a combo
  Cmake {
    #[command(flatten)]
    combo: ComboArgs,
  },

  /// Build a generated project (options must match the generated combo)
  Build {
    #[command(flatten)]
    combo: ComboArgs,

    /// Only build this target
    #[arg(long)]
    target: Option<String>,

    /// Number of parallel build jobs
    #[arg(long)]
    parallel: Option<u32>,
  },

  /// Generate documentation for every library
  Documentation,

  /// Copy prebuilt content out of the built editor
  Prebuilt {
    #[command(flatten)]
    combo: ComboArgs,
  },

  /// Package everything into standalone installable archives
  Pack {
    #[command(flatten)]
    combo: ComboArgs,
  },

  /// Run every stage in order: format --validate, cmake, build, prebuilt, documentation, pack
  All {
    #[command(flatten)]
    combo: ComboArgs,

    #[arg(long)]
    target: Option<String>,

    #[arg(long)]
    parallel: Option<u32>,

    /// Include clang-tidy in the format validation
    #[arg(long)]
    tidy: bool,
  },

  /// Show the host, project root and resolved combo
  Info {
    #[command(flatten)]
    combo: ComboArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_filter = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();

  let reporter = Reporter::new();
  let start = Instant::now();

  let (name, result) = match cli.command {
    Commands::Format { validate, tidy } => ("format", cmd_format(validate, tidy, &reporter)),
    Commands::Cmake { combo } => ("cmake", cmd_cmake(&combo, &reporter)),
    Commands::Build {
      combo,
      target,
      parallel,
    } => ("build", cmd_build(&combo, target, parallel, &reporter)),
    Commands::Documentation => ("documentation", cmd_documentation(&reporter)),
    Commands::Prebuilt { combo } => ("prebuilt", cmd_prebuilt(&combo, &reporter)),
    Commands::Pack { combo } => ("pack", cmd_pack(&combo, &reporter)),
    Commands::All {
      combo,
      target,
      parallel,
      tidy,
    } => ("all", cmd_all(&combo, target, parallel, tidy, &reporter)),
    Commands::Info { combo, output } => ("info", cmd_info(&combo, output, &reporter)),
  };

  match result {
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
    Ok(()) if reporter.has_failed() => {
      print_error(&format!("{name} finished with errors"));
      ExitCode::FAILURE
    }
    Ok(()) => {
      info!(command = name, elapsed = %format_duration(start.elapsed()), "done");
      ExitCode::SUCCESS
    }
  }
}
