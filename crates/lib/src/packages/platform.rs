//! Platform version table.
//!
//! A platform release ships a `versions.json` that pins the npm packages of
//! its components. The table is nested in sections; any object carrying an
//! `npmName` is an entry:
//!
//! ```json
//! {
//!   "core": {
//!     "button": { "npmName": "@vaadin/button", "jsVersion": "24.4.0" }
//!   },
//!   "react": {
//!     "react-components": {
//!       "npmName": "@vaadin/react-components",
//!       "jsVersion": "24.4.0",
//!       "mode": "react",
//!       "exclusions": ["@vaadin/button"]
//!     }
//!   },
//!   "platform": "24.4.0"
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::consts::{VAADIN_CORE_PACKAGE, VAADIN_ROUTER_PACKAGE};
use crate::manifest::PackageManifest;

/// Errors loading or writing a version table.
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("failed to read version table {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse version table {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to write version table {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Package versions pinned by the platform for the current mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformVersions {
  pins: BTreeMap<String, String>,
  exclusions: BTreeSet<String>,
}

impl PlatformVersions {
  /// Flatten a `versions.json` document for the given mode.
  ///
  /// `mode: "react"` entries apply only with React enabled, `mode: "lit"` only
  /// without it. With web-component exclusion requested, packages named in the
  /// `exclusions` arrays of applicable entries are dropped.
  pub fn from_value(json: &Value, react_enabled: bool, exclude_web_components: bool) -> Self {
    let mut versions = Self::default();
    let mut excluded = BTreeSet::new();
    versions.collect(json, react_enabled, &mut excluded);

    if exclude_web_components {
      for name in &excluded {
        versions.pins.remove(name);
      }
      versions.exclusions = excluded;
    }
    versions
  }

  fn collect(&mut self, node: &Value, react_enabled: bool, excluded: &mut BTreeSet<String>) {
    let Some(object) = node.as_object() else {
      return;
    };
    if !object.contains_key("npmName") {
      for child in object.values() {
        self.collect(child, react_enabled, excluded);
      }
      return;
    }

    let name = object.get("npmName").and_then(Value::as_str);
    let version = object
      .get("npmVersion")
      .or_else(|| object.get("jsVersion"))
      .and_then(Value::as_str);
    let (Some(name), Some(version)) = (name, version) else {
      return;
    };

    let applies = match object.get("mode").and_then(Value::as_str).unwrap_or("") {
      "react" => react_enabled,
      "lit" => !react_enabled,
      _ => true,
    };
    if !applies || name == VAADIN_CORE_PACKAGE || (react_enabled && name == VAADIN_ROUTER_PACKAGE) {
      debug!(package = %name, "skipping platform entry");
      return;
    }

    self.pins.insert(name.to_string(), version.to_string());
    if let Some(list) = object.get("exclusions").and_then(Value::as_array) {
      excluded.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
    }
  }

  /// Load and flatten a `versions.json` file.
  pub fn load(path: &Path, react_enabled: bool, exclude_web_components: bool) -> Result<Self, PlatformError> {
    let content = fs::read_to_string(path).map_err(|source| PlatformError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let json: Value = serde_json::from_str(&content).map_err(|source| PlatformError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Self::from_value(&json, react_enabled, exclude_web_components))
  }

  /// Add a pin.
  pub fn with_pin(mut self, name: &str, version: &str) -> Self {
    self.pins.insert(name.to_string(), version.to_string());
    self
  }

  pub fn pinned(&self, package: &str) -> Option<&str> {
    self.pins.get(package).map(String::as_str)
  }

  pub fn pins(&self) -> &BTreeMap<String, String> {
    &self.pins
  }

  /// Packages removed by web-component exclusion.
  pub fn exclusions(&self) -> &BTreeSet<String> {
    &self.exclusions
  }
}

/// Versions handed to the bundler: the platform pins, plus the versions of
/// framework-managed packages the platform does not pin.
pub fn versions_json(manifest: &PackageManifest, platform: &PlatformVersions) -> BTreeMap<String, String> {
  let mut versions = platform.pins().clone();
  for name in manifest.vaadin.dependencies.keys() {
    if versions.contains_key(name) {
      continue;
    }
    if let Some(version) = manifest.dependencies.get(name) {
      versions.insert(name.clone(), version.clone());
    }
  }
  versions
}

/// Write the bundler `versions.json`, creating parent folders.
pub fn write_versions_json(path: &Path, versions: &BTreeMap<String, String>) -> Result<(), PlatformError> {
  let write_err = |source| PlatformError::Write {
    path: path.to_path_buf(),
    source,
  };
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(write_err)?;
  }
  let mut content = serde_json::to_string_pretty(versions).map_err(|e| write_err(io::Error::other(e)))?;
  content.push('\n');
  fs::write(path, content).map_err(write_err)
}
