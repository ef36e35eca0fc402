use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn prebuilt_is_skipped_for_emscripten() {
  let env = TestEnv::project();

  env
    .welder_cmd()
    .args(["prebuilt", "--alias", "Emscripten"])
    .assert()
    .success()
    .stderr(predicate::str::contains("Skipping prebuilt content"));

  assert!(std::fs::read_dir(env.path("Build")).unwrap().next().is_none());
}

#[test]
fn prebuilt_without_editor_warns_and_activates() {
  let env = TestEnv::project();

  env
    .welder_cmd()
    .args(["prebuilt", "--alias", "Linux"])
    .assert()
    .success()
    .stderr(predicate::str::contains("Executable does not exist"));

  assert!(env.path("Build").join("Active").exists());
}

#[test]
fn documentation_without_doxyfile_fails() {
  let env = TestEnv::project();

  env.welder_cmd().arg("documentation").assert().failure();
}
