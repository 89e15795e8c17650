//! Dependency comparison between the manifest and a built bundle.

use std::collections::BTreeMap;

use tracing::debug;

use super::StaleReason;
use crate::consts::FLOW_FRONTEND_PACKAGE;
use crate::manifest::{BundleStats, PackageManifest};
use crate::scanner::DependencyScanner;
use crate::version::accepted;

/// Check that the bundle contains acceptable versions of every needed package.
///
/// A matching framework hash means the manifest is the one the bundle was
/// built from, so only the scanner's packages need checking. Otherwise every
/// declared dependency is checked as well; a differing hash alone is not
/// enough to rebuild.
pub(super) fn check(
  manifest: &PackageManifest,
  stats: &BundleStats,
  scanner: &dyn DependencyScanner,
) -> Option<StaleReason> {
  let Some(hash) = manifest.framework_hash() else {
    return Some(StaleReason::PackageHashMissing);
  };
  let Some(bundled_versions) = &stats.package_json_dependencies else {
    return Some(StaleReason::DependenciesNotRecorded);
  };

  let mut required: BTreeMap<String, String> = scanner.packages();
  if stats.package_json_hash.as_deref() != Some(hash) {
    debug!("package hash differs from bundle, comparing dependencies");
    for (name, version) in &manifest.dependencies {
      if name != FLOW_FRONTEND_PACKAGE {
        required.entry(name.clone()).or_insert_with(|| version.clone());
      }
    }
  }

  for (package, version) in required {
    let Some(bundled) = bundled_versions.get(&package) else {
      return Some(StaleReason::MissingPackage(package));
    };
    if !accepted(&version, bundled) {
      return Some(StaleReason::VersionMismatch {
        package,
        required: version,
        bundled: bundled.clone(),
      });
    }
  }
  None
}
