use predicates::prelude::*;

use super::common::{TestEnv, read};

#[test]
fn validate_reports_and_leaves_files_untouched() {
  let env = TestEnv::project();
  let file = env.write_file("Libraries/Core/Core.cpp", "// Old header\r\nint main() { return 0; }\r\n");
  let before = read(&file);

  env
    .welder_cmd()
    .args(["format", "--validate"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("must be welder-formatted"));

  assert_eq!(read(&file), before);
}

#[test]
fn external_sources_are_never_rewritten() {
  let env = TestEnv::project();
  let file = env.write_file("Libraries/Vendor/stb.h", "// External.\n/* vendored */\nint   x ;\r\n");
  let before = read(&file);

  // Exit status depends on which formatters are installed
  let _ = env.welder_cmd().arg("format").output().unwrap();

  assert_eq!(read(&file), before);
}

#[test]
fn fix_applies_house_header() {
  let env = TestEnv::project();
  let file = env.write_file("Libraries/Core/Core.h", "// Old header\n#pragma once\n");

  let _ = env.welder_cmd().arg("format").output().unwrap();

  let content = String::from_utf8(read(&file)).unwrap();
  assert!(content.starts_with("// MIT Licensed (see LICENSE.md).\n"));
  assert!(!content.contains("Old header"));
}
