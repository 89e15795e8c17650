use predicates::prelude::*;

use super::common::TestEnv;

const IMPORTS: &str = "src/main/frontend/generated/flow/generated-flow-imports.js";

#[test]
fn generates_main_import_file() {
  let env = TestEnv::empty();
  env.write_frontend("views/main.ts", "export {}");
  env.write_scan(r#"{ "packages": { "lit": "3.2.1" }, "chunks": [{ "modules": ["./views/main.ts", "lit"] }] }"#);

  env
    .flowbuild_cmd("imports")
    .assert()
    .success()
    .stdout(predicate::str::contains("Generated import files"));

  let content = env.read_file(IMPORTS);
  assert!(content.contains("import 'lit';"));
  assert!(content.contains("import 'Frontend/views/main.ts';"));
  assert_eq!(
    env.read_file("src/main/frontend/generated/flow/generated-flow-imports.d.ts"),
    "export {}\n"
  );
}

#[test]
fn lazy_chunk_gets_its_own_file() {
  let env = TestEnv::empty();
  env.write_frontend("views/admin.ts", "export {}");
  env.write_scan(r#"{ "chunks": [{ "triggers": ["com.example.AdminView"], "modules": ["./views/admin.ts"] }] }"#);

  env.flowbuild_cmd("imports").assert().success();

  let chunks: Vec<_> = std::fs::read_dir(env.path("src/main/frontend/generated/flow/chunks"))
    .unwrap()
    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(chunks.len(), 1);
  assert!(chunks[0].starts_with("chunk-"));
  assert!(env.read_file(IMPORTS).contains(&format!("./chunks/{}", chunks[0])));
}

#[test]
fn second_run_writes_nothing() {
  let env = TestEnv::empty();
  env.write_frontend("views/main.ts", "export {}");
  env.write_scan(r#"{ "chunks": [{ "modules": ["./views/main.ts"] }] }"#);
  env.flowbuild_cmd("imports").assert().success();

  env
    .flowbuild_cmd("imports")
    .assert()
    .success()
    .stdout(predicate::str::contains("Import files are up to date"));
}

#[test]
fn unresolved_imports_are_all_listed() {
  let env = TestEnv::empty();
  env.write_scan(r#"{ "chunks": [{ "modules": ["./missing-a.js", "./missing-b.js"] }] }"#);

  env
    .flowbuild_cmd("imports")
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing-a.js"))
    .stderr(predicate::str::contains("missing-b.js"));
}

#[test]
fn json_output_lists_written_files() {
  let env = TestEnv::empty();

  let output = env.run_json("imports", &[]);
  let written = output["written"].as_array().unwrap();
  assert!(written.iter().any(|p| p.as_str().unwrap().ends_with("generated-flow-imports.js")));
}

#[test]
fn conflicting_theme_locations_fail() {
  let env = TestEnv::empty();
  env.write_file("flowbuild.json", r#"{ "resourcesDirectory": "deps" }"#);
  env.write_file("deps/META-INF/resources/themes/app/theme.json", r#"{"lumoImports":["badge"]}"#);
  env.write_frontend("themes/app/theme.json", r#"{"lumoImports":["color"]}"#);
  env.write_scan(r#"{ "theme": { "name": "app" } }"#);

  env
    .flowbuild_cmd("imports")
    .assert()
    .failure()
    .stderr(predicate::str::contains("theme 'app' is defined in conflicting locations"))
    .stderr(predicate::str::contains("META-INF/resources/themes/app"))
    .stderr(predicate::str::contains("src/main/frontend/themes/app"));
}
