use anyhow::Result;

use welder_lib::pipeline::prebuilt;
use welder_lib::report::Reporter;

use super::{ComboArgs, runtime, workspace};

pub fn cmd_prebuilt(args: &ComboArgs, reporter: &Reporter) -> Result<()> {
  let ws = workspace(reporter)?;
  let combo = args.resolve(&ws);

  runtime()?.block_on(prebuilt(&ws, &combo));
  Ok(())
}
