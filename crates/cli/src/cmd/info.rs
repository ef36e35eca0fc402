//! Info command implementation.
//!
//! Shows where welder thinks the project is and which build directory the
//! given combo selects, without touching the filesystem.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use welder_lib::activate::{active_build_name, build_dir_name};
use welder_lib::combo::Combo;
use welder_lib::platform::HostOs;
use welder_lib::report::Reporter;

use super::{ComboArgs, workspace};
use crate::output::{OutputFormat, print_info, print_json, print_stat, symbols};

#[derive(Debug, Serialize)]
struct InfoReport {
  host: HostOs,
  root: PathBuf,
  combo: Combo,
  build_dir: String,
  active: Option<String>,
}

pub fn cmd_info(args: &ComboArgs, output: OutputFormat, reporter: &Reporter) -> Result<()> {
  let ws = workspace(reporter)?;
  let combo = args.resolve(&ws);

  let report = InfoReport {
    host: ws.host,
    root: ws.dirs.repo.clone(),
    build_dir: build_dir_name(ws.host, &combo),
    active: active_build_name(&ws.dirs),
    combo,
  };

  if output.is_json() {
    return print_json(&report);
  }

  print_info(&format!("Project {}", report.root.display()));
  print_stat("Host", report.host.as_str());
  print_stat("Target OS", &report.combo.targetos);
  print_stat("Builder", &report.combo.builder);
  print_stat("Toolchain", &report.combo.toolchain);
  print_stat("Platform", &report.combo.platform);
  print_stat("Architecture", &report.combo.architecture);
  print_stat("Config", &report.combo.config);
  print_stat("Build directory", &format!("{} {}", symbols::ARROW, report.build_dir));
  print_stat("Active", report.active.as_deref().unwrap_or("(none)"));
  Ok(())
}
