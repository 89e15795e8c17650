//! Package manifest maintenance.
//!
//! This module keeps `package.json` in line with what the application needs:
//! - [`reconcile`]: the pure reconciliation of a manifest against the desired
//!   dependency set
//! - [`update_packages`]: the task that loads, reconciles, saves, and cleans a
//!   stale installation
//! - [`effective_manifest`]: the manifest a fresh reconciliation would produce,
//!   used to judge whether the bundle is stale

mod cleanup;
mod defaults;
mod hash;
mod platform;
mod reconcile;

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

pub use cleanup::clean_stale_install;
pub use defaults::DefaultDependencies;
pub use hash::framework_hash;
pub use platform::{PlatformError, PlatformVersions, versions_json, write_versions_json};
pub use reconcile::{ReconcileOptions, Reconciliation, desired_dependencies, reconcile};

use crate::manifest::{DependencyKind, ManifestError, ManifestStore, PackageManifest};
use crate::scanner::DependencyScanner;

/// Errors from the package update task.
#[derive(Debug, Error)]
pub enum PackagesError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Platform(#[from] PlatformError),

  #[error("failed to remove {path}: {source}")]
  Cleanup {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Options for [`update_packages`].
#[derive(Debug, Clone)]
pub struct PackageUpdateOptions {
  pub reconcile: ReconcileOptions,
  /// Always remove `node_modules` and the lock file.
  pub clean_npm_files: bool,
  /// Where to write the bundler `versions.json`, if anywhere.
  pub versions_json: Option<PathBuf>,
}

/// Result of [`update_packages`].
#[derive(Debug, Clone)]
pub struct PackageUpdate {
  pub manifest: PackageManifest,
  /// Whether `package.json` was written.
  pub modified: bool,
  pub added: Vec<String>,
  pub removed: Vec<String>,
  /// Packages whose version changed: name -> (old, new).
  pub updated: BTreeMap<String, (String, String)>,
  /// Whether a stale installation was removed.
  pub cleaned: bool,
}

/// Reconcile the stored manifest with the scanned application and persist it.
///
/// The manifest is saved only when reconciliation changed it.
///
/// # Errors
///
/// Returns an error if the manifest can't be read (including malformed JSON),
/// written, or if cleaning the installation fails.
pub fn update_packages(
  store: &dyn ManifestStore,
  scanner: &dyn DependencyScanner,
  platform: &PlatformVersions,
  defaults: &DefaultDependencies,
  options: &PackageUpdateOptions,
) -> Result<PackageUpdate, PackagesError> {
  let current = store.load_manifest()?;
  let result = reconcile(
    current.as_ref(),
    &scanner.packages(),
    platform,
    defaults,
    &options.reconcile,
  );

  if result.modified {
    store.save_manifest(&result.manifest)?;
  }

  info!(
    added = result.added.len(),
    removed = result.removed.len(),
    updated = result.updated.len(),
    modified = result.modified,
    "package manifest reconciled"
  );

  if let Some(path) = &options.versions_json {
    write_versions_json(path, &versions_json(&result.manifest, platform))?;
  }

  let cleaned = clean_stale_install(
    &options.reconcile.base_dir,
    &result.manifest,
    options.reconcile.pnpm_enabled,
    options.clean_npm_files,
  )?;

  Ok(PackageUpdate {
    manifest: result.manifest,
    modified: result.modified,
    added: result.added,
    removed: result.removed,
    updated: result.updated,
    cleaned,
  })
}

/// Drop dependency entries that still carry the version the framework wrote.
///
/// What remains are the user's own choices, so reconciling the result yields
/// the current defaults rather than the ones recorded last time.
pub fn clean_old_platform_dependencies(manifest: &PackageManifest) -> PackageManifest {
  let mut cleaned = manifest.clone();
  for kind in DependencyKind::ALL {
    let record = cleaned.managed(kind).clone();
    cleaned
      .table_mut(kind)
      .retain(|name, version| record.get(name) != Some(version));
    cleaned.managed_mut(kind).clear();
  }
  cleaned
}

/// The manifest a package update would produce right now, without writing it.
pub fn effective_manifest(
  current: Option<&PackageManifest>,
  scanner_packages: &BTreeMap<String, String>,
  platform: &PlatformVersions,
  defaults: &DefaultDependencies,
  options: &ReconcileOptions,
) -> PackageManifest {
  let cleaned = current.map(clean_old_platform_dependencies);
  reconcile(cleaned.as_ref(), scanner_packages, platform, defaults, options).manifest
}
