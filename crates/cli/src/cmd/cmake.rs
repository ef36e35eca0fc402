use anyhow::Result;

use welder_lib::pipeline::configure;
use welder_lib::report::Reporter;

use super::{ComboArgs, runtime, workspace};
use crate::output::{print_stat, print_success};

pub fn cmd_cmake(args: &ComboArgs, reporter: &Reporter) -> Result<()> {
  let ws = workspace(reporter)?;
  let combo = args.resolve(&ws);

  if let Some(build_dir) = runtime()?.block_on(configure(&ws, &combo)) {
    if !reporter.has_failed() {
      print_success(&format!("Generated {}", build_dir.name));
    }
    print_stat("Build directory", &build_dir.path().display().to_string());
  }
  Ok(())
}
