use anyhow::Result;

use welder_lib::pipeline::{AllOptions, BuildOptions, all};
use welder_lib::report::Reporter;

use super::{ComboArgs, runtime, workspace};

/// Run every stage against one combo, resolved once up front.
pub fn cmd_all(
  args: &ComboArgs,
  target: Option<String>,
  parallel: Option<u32>,
  tidy: bool,
  reporter: &Reporter,
) -> Result<()> {
  let ws = workspace(reporter)?;
  let combo = args.resolve(&ws);
  let options = AllOptions {
    build: BuildOptions {
      config: args.config.clone(),
      target,
      parallel,
    },
    tidy,
  };

  runtime()?.block_on(all(&ws, &combo, &options));
  Ok(())
}
