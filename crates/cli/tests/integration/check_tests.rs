use predicates::prelude::*;
use serde_json::json;

use super::common::TestEnv;

/// Reconcile, then record stats as if the development bundle had been built
/// from the resulting package.json.
fn build_dev_bundle(env: &TestEnv, bundle_imports: &[&str], frontend_hashes: serde_json::Value) {
  env.flowbuild_cmd("reconcile").assert().success();
  let manifest = env.read_json("package.json");
  let stats = json!({
    "packageJsonHash": manifest["vaadin"]["hash"],
    "packageJsonDependencies": manifest["dependencies"],
    "bundleImports": bundle_imports,
    "frontendHashes": frontend_hashes,
  });
  env.write_file("src/main/dev-bundle/config/stats.json", &stats.to_string());
}

#[test]
fn missing_bundle_needs_build() {
  let env = TestEnv::empty();

  env
    .flowbuild_cmd("check")
    .assert()
    .success()
    .stdout(predicate::str::contains("needs to be rebuilt"))
    .stdout(predicate::str::contains("no previous bundle was found"));
}

#[test]
fn matching_bundle_is_up_to_date() {
  let env = TestEnv::empty();
  build_dev_bundle(&env, &[], json!({}));

  let output = env.run_json("check", &[]);
  assert_eq!(output["needs_build"], false);
  assert_eq!(output["reason"], serde_json::Value::Null);
}

#[test]
fn new_frontend_import_needs_build() {
  let env = TestEnv::empty();
  build_dev_bundle(&env, &[], json!({}));
  env.write_frontend("views/main.ts", "export {}");
  env.write_scan(r#"{ "chunks": [{ "modules": ["./views/main.ts"] }] }"#);

  let output = env.run_json("check", &[]);
  assert_eq!(output["needs_build"], true);
  assert_eq!(output["reason"], "import 'Frontend/views/main.ts' is not in the bundle");
}

#[test]
fn force_flag_needs_build() {
  let env = TestEnv::empty();
  build_dev_bundle(&env, &[], json!({}));

  let output = env.run_json("check", &["--force"]);
  assert_eq!(output["needs_build"], true);
  assert_eq!(output["reason"], "a rebuild was requested");
}

#[test]
fn live_reload_never_needs_build() {
  let env = TestEnv::empty();

  env
    .flowbuild_cmd("check")
    .args(["--mode", "live-reload"])
    .assert()
    .success()
    .stdout(predicate::str::contains("is up to date"));
}

#[test]
fn production_check_saves_decision() {
  let env = TestEnv::empty();

  let output = env.run_json("check", &["--mode", "production"]);
  assert_eq!(output["mode"], "production");
  assert_eq!(output["needs_build"], true);
  assert_eq!(env.read_file("target/needs-build"), "true");
}

#[test]
fn skip_dev_bundle_option_is_honored() {
  let env = TestEnv::empty();
  env.write_file("flowbuild.json", r#"{ "skipDevBundle": true }"#);
  env.write_file("src/main/dev-bundle/config/stats.json", "{}");

  let output = env.run_json("check", &[]);
  assert_eq!(output["needs_build"], false);
}

#[test]
fn unreadable_stats_need_build() {
  let env = TestEnv::empty();
  env.write_file("src/main/dev-bundle/config/stats.json", "{ broken");

  let output = env.run_json("check", &[]);
  assert_eq!(output["needs_build"], true);
}

#[test]
fn conflicting_theme_locations_fail() {
  let env = TestEnv::empty();
  build_dev_bundle(&env, &[], json!({}));
  env.write_file("flowbuild.json", r#"{ "resourcesDirectory": "deps" }"#);
  env.write_file("deps/META-INF/resources/themes/app/theme.json", r#"{"lumoImports":["badge"]}"#);
  env.write_frontend("themes/app/theme.json", r#"{"lumoImports":["color"]}"#);
  env.write_scan(r#"{ "theme": { "name": "app" } }"#);

  env
    .flowbuild_cmd("check")
    .assert()
    .failure()
    .stderr(predicate::str::contains("conflicting locations"))
    .stderr(predicate::str::contains("META-INF/resources/themes/app"));
}

#[test]
fn bundle_without_recorded_packages_needs_build() {
  let env = TestEnv::empty();
  env.flowbuild_cmd("reconcile").assert().success();
  let manifest = env.read_json("package.json");
  let stats = json!({ "packageJsonHash": manifest["vaadin"]["hash"] });
  env.write_file("src/main/dev-bundle/config/stats.json", &stats.to_string());

  let output = env.run_json("check", &[]);
  assert_eq!(output["needs_build"], true);
  assert_eq!(output["reason"], "the bundle recorded no package versions");
}
