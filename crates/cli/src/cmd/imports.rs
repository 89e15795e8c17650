//! Implementation of the `flowbuild imports` command.

use std::path::Path;

use anyhow::{Context, Result};

use flowbuild_lib::imports::{ImportsOptions, update_imports};
use flowbuild_lib::manifest::{PackageManifest, load_manifest};

use super::{Project, known_packages, load_scan};
use crate::output::{Change, OutputFormat, print_change, print_json, print_success};

pub fn cmd_imports(project: &Project, scan: &Path, production: bool, output: OutputFormat) -> Result<()> {
  let scan = load_scan(scan)?;
  let layout = &project.layout;
  let manifest = load_manifest(&layout.package_json())
    .context("Failed to load package.json")?
    .unwrap_or_else(PackageManifest::skeleton);

  let options = ImportsOptions {
    production,
    frontend_dir: layout.frontend_dir.clone(),
    node_modules_dir: layout.node_modules(),
    known_packages: known_packages(&manifest, &scan),
  };
  let resources = project.resources();
  let dir = layout.generated_flow_dir();
  let report = update_imports(&scan, &options, resources.as_ref(), &dir).context("Failed to generate import files")?;

  if output.is_json() {
    print_json(&serde_json::json!({
      "directory": dir,
      "written": report.written,
      "removed": report.removed,
    }))?;
    return Ok(());
  }

  if report.written.is_empty() && report.removed.is_empty() {
    print_success("Import files are up to date");
    return Ok(());
  }
  print_success(&format!("Generated import files in {}", dir.display()));
  for path in &report.written {
    print_change(Change::Updated, &path.display().to_string());
  }
  for path in &report.removed {
    print_change(Change::Removed, &path.display().to_string());
  }
  Ok(())
}
