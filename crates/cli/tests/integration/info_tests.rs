use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn info_json_describes_resolved_combo() {
  let env = TestEnv::project();

  let output = env
    .welder_cmd()
    .args(["info", "--alias", "Emscripten", "--config", "Debug", "-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["combo"]["toolchain"], "Emscripten");
  assert_eq!(report["combo"]["architecture"], "WASM");
  assert_eq!(report["combo"]["config"], "Debug");
  assert_eq!(report["root"], env.root().to_string_lossy().as_ref());
  assert!(
    report["build_dir"]
      .as_str()
      .unwrap()
      .ends_with("_Emscripten_Ninja_Emscripten_Emscripten_WASM_Debug")
  );
  assert!(report["active"].is_null());
}

#[test]
fn info_text_lists_build_directory() {
  let env = TestEnv::project();

  env
    .welder_cmd()
    .args(["info", "--alias", "Windows"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Visual Studio 16 2019"))
    .stdout(predicate::str::contains("_Windows_Visual-Studio-16-2019_MSVC_Windows_X64_Any"));
}

#[test]
fn info_does_not_activate() {
  let env = TestEnv::project();

  env.welder_cmd().args(["info", "--alias", "Linux"]).assert().success();

  assert!(std::fs::read_dir(env.path("Build")).unwrap().next().is_none());
}

#[test]
fn unknown_alias_falls_back_but_fails() {
  let env = TestEnv::project();

  let output = env
    .welder_cmd()
    .args(["info", "--alias", "Amiga", "-o", "json"])
    .output()
    .unwrap();

  assert!(!output.status.success());
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["combo"]["platform"], "Stub");
  assert!(String::from_utf8_lossy(&output.stderr).contains("Undefined alias Amiga"));
}
