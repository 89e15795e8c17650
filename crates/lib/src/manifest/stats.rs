//! The bundle statistics manifest (`stats.json`).
//!
//! Written by the bundler after each successful build and only read here.
//! Every field is optional on input: an old bundle missing a field is still
//! readable, it just fails the corresponding check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot of what the last successful build contained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleStats {
  /// Package versions resolved at bundle time. `None` when the bundler did
  /// not record them, which leaves nothing to validate against.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub package_json_dependencies: Option<BTreeMap<String, String>>,

  /// Framework hash of the manifest used for the build.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub package_json_hash: Option<String>,

  pub entry_scripts: Vec<String>,

  /// Module specifiers included in the bundle.
  pub bundle_imports: Vec<String>,

  /// Frontend-relative path to content hash.
  pub frontend_hashes: BTreeMap<String, String>,

  /// Theme key to serialized `theme.json` content. `None` when the bundle
  /// recorded no theme information at all.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub theme_json_contents: Option<BTreeMap<String, String>>,

  /// Tags of web components exported by the bundle.
  pub web_components: Vec<String>,
}

impl BundleStats {
  /// Parse stats JSON.
  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }

  pub fn frontend_hash(&self, path: &str) -> Option<&str> {
    self.frontend_hashes.get(path).map(String::as_str)
  }
}
