use anyhow::Result;

use welder_lib::pipeline::{BuildOptions, build};
use welder_lib::report::Reporter;

use super::{ComboArgs, runtime, workspace};
use crate::output::print_stat;

pub fn cmd_build(args: &ComboArgs, target: Option<String>, parallel: Option<u32>, reporter: &Reporter) -> Result<()> {
  let ws = workspace(reporter)?;
  let combo = args.resolve(&ws);
  let options = BuildOptions {
    config: args.config.clone(),
    target,
    parallel,
  };

  let test_executables = runtime()?.block_on(build(&ws, &combo, &options));
  for executable in test_executables {
    print_stat("Test executable", &executable.display().to_string());
  }
  Ok(())
}
