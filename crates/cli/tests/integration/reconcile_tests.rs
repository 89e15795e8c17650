use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn reconcile_creates_package_json() {
  let env = TestEnv::empty();

  env
    .flowbuild_cmd("reconcile")
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated"));

  let manifest = env.read_json("package.json");
  assert_eq!(manifest["name"], "no-name");
  assert_eq!(manifest["license"], "UNLICENSED");
  assert_eq!(manifest["type"], "module");
  assert!(manifest["vaadin"]["hash"].as_str().is_some_and(|h| !h.is_empty()));
  assert!(env.path("target/versions.json").is_file());
}

#[test]
fn second_reconcile_changes_nothing() {
  let env = TestEnv::empty();
  env.flowbuild_cmd("reconcile").assert().success();
  let before = env.read_file("package.json");

  env
    .flowbuild_cmd("reconcile")
    .assert()
    .success()
    .stdout(predicate::str::contains("package.json is up to date"));
  assert_eq!(env.read_file("package.json"), before);
}

#[test]
fn scanned_package_is_added_and_reported() {
  let env = TestEnv::empty();
  env.write_scan(r#"{ "packages": { "@scope/pkg": "1.2.3" } }"#);

  let output = env.run_json("reconcile", &[]);
  assert_eq!(output["modified"], true);
  assert!(
    output["added"]
      .as_array()
      .unwrap()
      .iter()
      .any(|name| name == "@scope/pkg")
  );

  let manifest = env.read_json("package.json");
  assert_eq!(manifest["dependencies"]["@scope/pkg"], "1.2.3");
  assert_eq!(manifest["vaadin"]["dependencies"]["@scope/pkg"], "1.2.3");
}

#[test]
fn user_file_reference_is_preserved() {
  let env = TestEnv::empty();
  env.write_file(
    "package.json",
    r#"{ "name": "my-app", "dependencies": { "@scope/pkg": "file:../pkg" } }"#,
  );
  env.write_scan(r#"{ "packages": { "@scope/pkg": "1.2.3" } }"#);

  env.flowbuild_cmd("reconcile").assert().success();

  let manifest = env.read_json("package.json");
  assert_eq!(manifest["name"], "my-app");
  assert_eq!(manifest["dependencies"]["@scope/pkg"], "file:../pkg");
}

#[test]
fn platform_versions_pin_defaults() {
  let env = TestEnv::empty();
  env.write_file(
    "versions.json",
    r#"{ "core": { "lit": { "npmName": "lit", "jsVersion": "3.3.0" } } }"#,
  );

  env
    .flowbuild_cmd("reconcile")
    .arg("--versions")
    .arg(env.path("versions.json"))
    .assert()
    .success();

  assert_eq!(env.read_json("package.json")["dependencies"]["lit"], "3.3.0");
  assert_eq!(env.read_json("target/versions.json")["lit"], "3.3.0");
}

#[test]
fn malformed_package_json_fails_naming_file() {
  let env = TestEnv::empty();
  env.write_file("package.json", "{ broken");

  env
    .flowbuild_cmd("reconcile")
    .assert()
    .failure()
    .stderr(predicate::str::contains("package.json"));
}
