//! Implementation of the `flowbuild reconcile` command.
//!
//! Brings `package.json` in line with the packages the application declares
//! and writes the merged `versions.json` for the bundler.

use std::path::Path;

use anyhow::{Context, Result};

use flowbuild_lib::bundle::Mode;
use flowbuild_lib::manifest::FsManifestStore;
use flowbuild_lib::packages::{DefaultDependencies, PackageUpdateOptions, update_packages};

use super::{Project, load_scan};
use crate::output::{
  Change, OutputFormat, print_change, print_detail, print_info, print_json, print_success, print_warning, short_hash,
  symbols,
};

pub fn cmd_reconcile(
  project: &Project,
  scan: &Path,
  versions: Option<&Path>,
  verbose: bool,
  output: OutputFormat,
) -> Result<()> {
  let scan = load_scan(scan)?;
  let layout = &project.layout;
  let store = FsManifestStore::new(layout.package_json(), layout.stats_json(Mode::Development));
  let platform = project.platform(versions)?;

  let options = PackageUpdateOptions {
    reconcile: project.reconcile_options(),
    clean_npm_files: project.options.clean_npm_files,
    versions_json: Some(layout.generated_versions_json()),
  };
  let update = update_packages(&store, &scan, &platform, &DefaultDependencies::builtin(), &options)
    .with_context(|| format!("Failed to update {}", layout.package_json().display()))?;

  let hash = update.manifest.framework_hash().unwrap_or_default();
  if output.is_json() {
    let updated: serde_json::Map<_, _> = update
      .updated
      .iter()
      .map(|(name, (old, new))| (name.clone(), serde_json::json!({ "from": old, "to": new })))
      .collect();
    print_json(&serde_json::json!({
      "modified": update.modified,
      "added": update.added,
      "removed": update.removed,
      "updated": updated,
      "cleaned": update.cleaned,
      "hash": hash,
    }))?;
    return Ok(());
  }

  if update.modified {
    print_success(&format!("Updated {}", layout.package_json().display()));
  } else {
    print_info("package.json is up to date");
  }
  print_detail("Added", &update.added.len().to_string());
  print_detail("Removed", &update.removed.len().to_string());
  print_detail("Updated", &update.updated.len().to_string());
  print_detail("Hash", short_hash(hash));

  if verbose || update.modified {
    for name in &update.added {
      let version = update.manifest.declared_version(name).unwrap_or_default();
      print_change(Change::Added, &format!("{} {}", name, version));
    }
    for name in &update.removed {
      print_change(Change::Removed, name);
    }
    for (name, (old, new)) in &update.updated {
      print_change(Change::Updated, &format!("{} {} {} {}", name, old, symbols::ARROW, new));
    }
  }

  if update.cleaned {
    print_warning("Removed stale node_modules and lock file; run the package manager again");
  }

  Ok(())
}
