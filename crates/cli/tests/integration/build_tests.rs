//! `wasmpub build` end to end.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_publishes_generated_and_static_files() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "sdfbox-client"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Published sdfbox-client"))
    .stdout(predicate::str::contains("Files: 4"));

  assert_eq!(
    env.list("server/assets"),
    vec!["a.png", "b.json", "sdfbox-client.js", "sdfbox-client.wasm"]
  );
  assert_eq!(env.read_file("server/assets/sdfbox-client.wasm"), "client-wasm");
}

#[test]
fn build_reports_each_stage() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "sdfbox-client"])
    .assert()
    .success()
    .stdout(predicate::str::contains("prepared"))
    .stdout(predicate::str::contains("compiled"))
    .stdout(predicate::str::contains("bound"))
    .stdout(predicate::str::contains("assets merged"));
}

#[test]
fn build_all_publishes_every_target() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "--all"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Published 2 targets"));

  assert_eq!(env.read_file("server/assets/sdfbox-client.wasm"), "client-wasm");
  assert_eq!(env.read_file("server/editor/sdfbox-editor.wasm"), "editor-wasm");
}

#[test]
fn build_writes_nothing_beside_published_dirs() {
  let env = TestEnv::new();

  env.cmd().args(["build", "--all"]).assert().success();

  assert_eq!(env.list("server"), vec!["assets", "editor"]);
}

#[test]
fn build_replaces_previous_published_set() {
  let env = TestEnv::new();
  env.write_file("server/assets/old.wasm", "previous build");

  env.cmd().args(["build", "sdfbox-client"]).assert().success();

  assert!(!env.path("server/assets/old.wasm").exists());
}

#[test]
fn compiler_failure_exits_nonzero_with_diagnostics() {
  let env = TestEnv::new();
  env.cmd().args(["build", "sdfbox-client"]).assert().success();
  env.write_file(
    "tools/cargo.sh",
    "#!/bin/sh\necho 'error: undefined symbol: sdf_eval' >&2\nexit 1\n",
  );

  env
    .cmd()
    .args(["build", "sdfbox-client"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("compile failed"))
    .stderr(predicate::str::contains("undefined symbol: sdf_eval"))
    .stderr(predicate::str::contains("left unchanged"));

  assert_eq!(env.read_file("server/assets/sdfbox-client.wasm"), "client-wasm");
}

#[test]
fn binder_without_output_fails_before_merge() {
  let env = TestEnv::new();
  env.write_file("tools/bindgen.sh", "#!/bin/sh\nexit 0\n");

  env
    .cmd()
    .args(["build", "sdfbox-client"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("bind failed"))
    .stderr(predicate::str::contains("did not write"));

  assert!(!env.path("build/sdfbox-client/a.png").exists());
  assert!(!env.path("server/assets").exists());
}

#[test]
fn build_all_stops_at_first_failing_target() {
  let env = TestEnv::new();
  std::fs::remove_file(env.path("src/client.rs")).unwrap();

  env.cmd().args(["build", "--all"]).assert().failure();

  assert!(!env.path("server/assets").exists());
  assert!(!env.path("server/editor").exists());
  assert!(!env.path("build/sdfbox-editor").exists());
}

#[test]
fn build_json_reports_published_files() {
  let env = TestEnv::new();

  let output = env
    .cmd()
    .args(["--output", "json", "build", "sdfbox-client"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(reports[0]["target"], "sdfbox-client");
  assert_eq!(reports[0]["publish"]["files"].as_array().unwrap().len(), 4);
}

#[test]
fn rebuild_without_changes_is_stable() {
  let env = TestEnv::new();

  env.cmd().args(["build", "sdfbox-client"]).assert().success();
  let first = env.list("server/assets");
  env.cmd().args(["build", "sdfbox-client"]).assert().success();

  assert_eq!(env.list("server/assets"), first);
  assert_eq!(env.read_file("server/assets/sdfbox-client.js"), "export default \"sdfbox-client\";\n");
}
