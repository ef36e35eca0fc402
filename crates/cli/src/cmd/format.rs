use anyhow::Result;

use welder_lib::format::{FormatMode, FormatOptions};
use welder_lib::pipeline::run_format;
use welder_lib::report::Reporter;

use super::{runtime, workspace};

pub fn cmd_format(validate: bool, tidy: bool, reporter: &Reporter) -> Result<()> {
  let ws = workspace(reporter)?;
  let options = FormatOptions {
    mode: FormatMode::from_validate(validate),
    tidy,
  };

  runtime()?.block_on(run_format(&ws, options));
  Ok(())
}
