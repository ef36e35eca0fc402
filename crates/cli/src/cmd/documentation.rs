use anyhow::Result;

use welder_lib::pipeline::documentation;
use welder_lib::report::Reporter;

use super::{runtime, workspace};
use crate::output::print_stat;

pub fn cmd_documentation(reporter: &Reporter) -> Result<()> {
  let ws = workspace(reporter)?;

  let generated = runtime()?.block_on(documentation(&ws));
  for output_dir in generated {
    print_stat("Documentation", &output_dir.display().to_string());
  }
  Ok(())
}
