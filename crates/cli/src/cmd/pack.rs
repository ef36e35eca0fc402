use anyhow::Result;

use welder_lib::pipeline::pack;
use welder_lib::report::Reporter;

use super::{ComboArgs, runtime, workspace};
use crate::output::{print_stat, print_success};

pub fn cmd_pack(args: &ComboArgs, reporter: &Reporter) -> Result<()> {
  let ws = workspace(reporter)?;
  let combo = args.resolve(&ws);

  let archives = runtime()?.block_on(pack(&ws, &combo));
  if !archives.is_empty() {
    print_success(&format!("Packed {} archive(s)", archives.len()));
  }
  for archive in archives {
    print_stat("Package", &archive.display().to_string());
  }
  Ok(())
}
