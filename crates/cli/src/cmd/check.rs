//! Implementation of the `flowbuild check` command.
//!
//! Decides whether the frontend bundle for a mode must be rebuilt. The
//! production decision is also saved for the later bundler step.

use std::path::Path;

use anyhow::{Context, Result};

use flowbuild_lib::bundle::{CheckOptions, FrontendSources, Mode, evaluate, load_previous_stats, save_result};
use flowbuild_lib::manifest::{FsManifestStore, ManifestStore};
use flowbuild_lib::packages::{DefaultDependencies, effective_manifest};
use flowbuild_lib::scanner::DependencyScanner;
use flowbuild_lib::util::hash::Sha256Hasher;

use super::{Project, known_packages, load_scan};
use crate::output::{OutputFormat, print_detail, print_info, print_json, print_success};

pub fn cmd_check(project: &Project, scan: &Path, mode: Mode, force: bool, output: OutputFormat) -> Result<()> {
  let scan = load_scan(scan)?;
  let layout = &project.layout;
  let store = FsManifestStore::new(layout.package_json(), layout.stats_json(mode));

  // Compare against the manifest a package update would write now
  let current = store.load_manifest().context("Failed to load package.json")?;
  let platform = project.platform(None)?;
  let manifest = effective_manifest(
    current.as_ref(),
    &scan.packages(),
    &platform,
    &DefaultDependencies::builtin(),
    &project.reconcile_options(),
  );

  let previous = load_previous_stats(&store);
  let known = known_packages(&manifest, &scan);
  let resources = project.resources();
  let node_modules = layout.node_modules();
  let sources = FrontendSources {
    frontend_dir: &layout.frontend_dir,
    node_modules_dir: &node_modules,
    resources: resources.as_ref(),
    hasher: &Sha256Hasher,
    known_packages: &known,
  };
  let options = CheckOptions {
    mode,
    force: force || (mode == Mode::Production && project.options.force_production_build),
    skip_dev_bundle: project.options.skip_dev_bundle,
  };

  let decision =
    evaluate(&manifest, previous.as_ref(), &scan, &sources, &options).context("Failed to check the frontend bundle")?;

  if mode == Mode::Production {
    save_result(&layout.build_dir, decision.needs_build)
      .with_context(|| format!("Failed to save build decision in {}", layout.build_dir.display()))?;
  }

  let reason = decision.reason.as_ref().map(ToString::to_string);
  if output.is_json() {
    print_json(&serde_json::json!({
      "mode": mode_name(mode),
      "needs_build": decision.needs_build,
      "reason": reason,
    }))?;
  } else if decision.needs_build {
    print_info(&format!("The {} bundle needs to be rebuilt", mode_name(mode)));
    if let Some(reason) = &reason {
      print_detail("Reason", reason);
    }
  } else {
    print_success(&format!("The {} bundle is up to date", mode_name(mode)));
  }

  Ok(())
}

fn mode_name(mode: Mode) -> &'static str {
  match mode {
    Mode::Development => "development",
    Mode::Production => "production",
    Mode::LiveReload => "live-reload",
  }
}
