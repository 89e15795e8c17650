//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated project directory.
///
/// Uses the conventional layout: `package.json` at the root, sources in
/// `src/main/frontend`, build outputs in `target`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project with an empty scan result.
  pub fn empty() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_scan("{}");
    env
  }

  /// Canonical project directory.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.root().join(relative_path)
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write a file relative to the frontend folder.
  pub fn write_frontend(&self, relative_path: &str, content: &str) {
    self.write_file(&format!("src/main/frontend/{}", relative_path), content);
  }

  /// Replace the scan result every command reads.
  pub fn write_scan(&self, content: &str) {
    self.write_file("scan.json", content);
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path)).unwrap()
  }

  pub fn read_json(&self, relative_path: &str) -> Value {
    serde_json::from_str(&self.read_file(relative_path)).unwrap()
  }

  /// A Command for the flowbuild binary running `subcommand` on this project.
  pub fn flowbuild_cmd(&self, subcommand: &str) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("flowbuild");
    cmd.arg("--project").arg(self.root());
    cmd.arg(subcommand).arg("--scan").arg(self.path("scan.json"));
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// Parsed JSON output of a successful command.
  pub fn run_json(&self, subcommand: &str, args: &[&str]) -> Value {
    let output = self
      .flowbuild_cmd(subcommand)
      .args(args)
      .args(["-o", "json"])
      .output()
      .unwrap();
    assert!(
      output.status.success(),
      "{} failed: {}",
      subcommand,
      String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
  }
}
