//! Package manifest reconciliation.
//!
//! [`reconcile`] is a pure function: it takes the manifest as loaded (or
//! `None`), the packages the application needs, and returns the manifest the
//! framework wants on disk together with what changed. Reading and writing
//! the file is left to the caller.
//!
//! The `vaadin` section records what the framework wrote last time. It is what
//! tells a user edit (keep it unless ours is newer) apart from a version the
//! framework chose itself (replace it, also when the new one is older).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use super::defaults::DefaultDependencies;
use super::hash::framework_hash;
use super::platform::PlatformVersions;
use crate::consts::{DEFAULT_LICENSE, DEFAULT_MODULE_TYPE, DEFAULT_PACKAGE_NAME};
use crate::manifest::{DependencyKind, PackageManifest};
use crate::util::hash::Sha256Hasher;
use crate::version::{floor, is_newer};

/// Options for [`reconcile`].
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
  /// Folder holding `package.json`; part of the framework hash.
  pub base_dir: PathBuf,
  pub react_enabled: bool,
  pub exclude_web_components: bool,
  /// Write overrides to `pnpm.overrides` instead of `overrides`.
  pub pnpm_enabled: bool,
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
  pub manifest: PackageManifest,
  /// Whether `manifest` differs from what was loaded.
  pub modified: bool,
  /// Packages added to a dependency table.
  pub added: Vec<String>,
  /// Packages removed from a dependency table.
  pub removed: Vec<String>,
  /// Packages whose version changed: name -> (old, new).
  pub updated: BTreeMap<String, (String, String)>,
}

/// The dependency set the framework wants, per table.
///
/// Scanner versions win over platform pins, which win over the built-in
/// defaults. Packages requested by the scanner always land in `dependencies`.
pub fn desired_dependencies(
  scanner_packages: &BTreeMap<String, String>,
  platform: &PlatformVersions,
  defaults: &DefaultDependencies,
  options: &ReconcileOptions,
) -> BTreeMap<DependencyKind, BTreeMap<String, String>> {
  let (mut dependencies, mut dev_dependencies) = defaults.for_mode(options.react_enabled);

  for table in [&mut dependencies, &mut dev_dependencies] {
    for (name, version) in table.iter_mut() {
      if let Some(pinned) = platform.pinned(name) {
        *version = pinned.to_string();
      }
    }
  }

  for (name, version) in scanner_packages {
    dev_dependencies.remove(name);
    dependencies.insert(name.clone(), version.clone());
  }

  if options.exclude_web_components {
    for name in platform.exclusions() {
      dependencies.remove(name);
      dev_dependencies.remove(name);
    }
  }

  BTreeMap::from([
    (DependencyKind::Dependencies, dependencies),
    (DependencyKind::DevDependencies, dev_dependencies),
  ])
}

/// Bring a manifest in line with the desired dependency set.
pub fn reconcile(
  current: Option<&PackageManifest>,
  scanner_packages: &BTreeMap<String, String>,
  platform: &PlatformVersions,
  defaults: &DefaultDependencies,
  options: &ReconcileOptions,
) -> Reconciliation {
  let desired = desired_dependencies(scanner_packages, platform, defaults, options);
  let mut manifest = current.cloned().unwrap_or_else(PackageManifest::skeleton);
  manifest.name.get_or_insert_with(|| DEFAULT_PACKAGE_NAME.to_string());
  manifest.license.get_or_insert_with(|| DEFAULT_LICENSE.to_string());
  manifest.type_.get_or_insert_with(|| DEFAULT_MODULE_TYPE.to_string());

  let mut added = Vec::new();
  let mut removed = Vec::new();
  let mut updated = BTreeMap::new();
  let mut dropped_managed = Vec::new();

  for kind in DependencyKind::ALL {
    let wanted = desired.get(&kind).cloned().unwrap_or_default();
    let previous = manifest.managed(kind).clone();

    // Packages the framework added before but no longer needs
    for name in previous.keys().filter(|name| !wanted.contains_key(*name)) {
      dropped_managed.push(name.clone());
      let Some(version) = manifest.table(kind).get(name) else {
        continue;
      };
      if floor(version).is_none() {
        debug!(package = %name, version = %version, "keeping user reference");
        continue;
      }
      manifest.table_mut(kind).remove(name);
      removed.push(name.clone());
    }

    for (name, version) in &wanted {
      let table = manifest.table_mut(kind);
      match table.get(name).cloned() {
        None => {
          table.insert(name.clone(), version.clone());
          added.push(name.clone());
        }
        Some(existing) if existing == *version => {}
        Some(existing) if floor(&existing).is_none() => {
          debug!(package = %name, version = %existing, "keeping user reference");
        }
        Some(existing) => {
          let framework_owned = previous.get(name) == Some(&existing);
          if framework_owned || is_newer(version, &existing) {
            table.insert(name.clone(), version.clone());
            updated.insert(name.clone(), (existing, version.clone()));
          }
        }
      }
    }

    *manifest.managed_mut(kind) = wanted;
  }

  update_overrides(&mut manifest, options.pnpm_enabled, &dropped_managed);
  manifest.vaadin.hash = framework_hash(&manifest, &options.base_dir, &Sha256Hasher).0;

  let modified = current != Some(&manifest);
  Reconciliation {
    manifest,
    modified,
    added,
    removed,
    updated,
  }
}

/// Refresh the `$name` back-references of framework-managed packages.
///
/// Existing values are copied through, so a user override of a managed
/// package stays as written. A back-reference is removed once its package is
/// gone from both tables, or once the framework stopped managing it.
fn update_overrides(manifest: &mut PackageManifest, pnpm: bool, dropped_managed: &[String]) {
  let mut overrides = manifest.overrides(pnpm).cloned().unwrap_or_default();

  let managed: Vec<String> = DependencyKind::ALL
    .iter()
    .flat_map(|kind| manifest.managed(*kind).keys())
    .filter(|name| manifest.declared_version(name).is_some())
    .cloned()
    .collect();
  for name in managed {
    overrides
      .entry(name.clone())
      .or_insert_with(|| Value::String(format!("${}", name)));
  }

  overrides.retain(|name, value| {
    let self_reference = value.as_str() == Some(format!("${}", name).as_str());
    let is_reference = value.as_str().is_some_and(|v| v.starts_with('$'));
    let target_gone = manifest.declared_version(name).is_none();
    !((is_reference && target_gone) || (self_reference && dropped_managed.contains(name)))
  });

  if pnpm && overrides.is_empty() && manifest.pnpm.is_none() {
    return;
  }
  *manifest.overrides_mut(pnpm) = overrides;
}
