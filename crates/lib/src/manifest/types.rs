//! Typed `package.json` model.
//!
//! The manifest is parsed into [`PackageManifest`] at the storage boundary and
//! serialized back from it, so every map is a [`BTreeMap`] and keys come out
//! sorted no matter how the file on disk was ordered. Keys this crate does not
//! model (`scripts`, `engines`, ...) are kept in `extra` and written back
//! unchanged.
//!
//! # Format
//!
//! ```json
//! {
//!   "name": "no-name",
//!   "license": "UNLICENSED",
//!   "type": "module",
//!   "dependencies": { "lit": "3.2.0" },
//!   "devDependencies": { "vite": "5.4.8" },
//!   "overrides": { "lit": "$lit" },
//!   "vaadin": {
//!     "dependencies": { "lit": "3.2.0" },
//!     "devDependencies": { "vite": "5.4.8" },
//!     "hash": "9f2c..."
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{DEFAULT_LICENSE, DEFAULT_MODULE_TYPE, DEFAULT_PACKAGE_NAME};

/// The persisted package manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub license: Option<String>,

  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub type_: Option<String>,

  #[serde(default)]
  pub dependencies: BTreeMap<String, String>,

  #[serde(default)]
  pub dev_dependencies: BTreeMap<String, String>,

  /// npm overrides. Values are a pinned version, a `$name` back-reference or a
  /// nested object, so they are kept as raw JSON.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub overrides: BTreeMap<String, Value>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pnpm: Option<PnpmSection>,

  /// What the framework wrote last time.
  #[serde(default)]
  pub vaadin: FrameworkSection,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// The `pnpm` object; only `overrides` is modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PnpmSection {
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub overrides: BTreeMap<String, Value>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// The framework bookkeeping object stored under `vaadin`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSection {
  #[serde(default)]
  pub dependencies: BTreeMap<String, String>,

  #[serde(default)]
  pub dev_dependencies: BTreeMap<String, String>,

  /// Digest over the managed dependency set and the project location.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub hash: String,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Which dependency table an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
  Dependencies,
  DevDependencies,
}

impl PackageManifest {
  /// The minimal manifest written for a project that has none.
  pub fn skeleton() -> Self {
    Self {
      name: Some(DEFAULT_PACKAGE_NAME.to_string()),
      license: Some(DEFAULT_LICENSE.to_string()),
      type_: Some(DEFAULT_MODULE_TYPE.to_string()),
      ..Self::default()
    }
  }

  /// Parse manifest JSON.
  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }

  /// Canonical serialized form: two-space indentation, sorted maps, trailing newline.
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    let mut content = serde_json::to_string_pretty(self)?;
    content.push('\n');
    Ok(content)
  }

  /// The user-facing dependency table of the given kind.
  pub fn table(&self, kind: DependencyKind) -> &BTreeMap<String, String> {
    match kind {
      DependencyKind::Dependencies => &self.dependencies,
      DependencyKind::DevDependencies => &self.dev_dependencies,
    }
  }

  pub fn table_mut(&mut self, kind: DependencyKind) -> &mut BTreeMap<String, String> {
    match kind {
      DependencyKind::Dependencies => &mut self.dependencies,
      DependencyKind::DevDependencies => &mut self.dev_dependencies,
    }
  }

  /// The framework's record of the given kind.
  pub fn managed(&self, kind: DependencyKind) -> &BTreeMap<String, String> {
    match kind {
      DependencyKind::Dependencies => &self.vaadin.dependencies,
      DependencyKind::DevDependencies => &self.vaadin.dev_dependencies,
    }
  }

  pub fn managed_mut(&mut self, kind: DependencyKind) -> &mut BTreeMap<String, String> {
    match kind {
      DependencyKind::Dependencies => &mut self.vaadin.dependencies,
      DependencyKind::DevDependencies => &mut self.vaadin.dev_dependencies,
    }
  }

  /// The override table in use: `pnpm.overrides` for pnpm, `overrides` otherwise.
  pub fn overrides(&self, pnpm: bool) -> Option<&BTreeMap<String, Value>> {
    if pnpm {
      self.pnpm.as_ref().map(|p| &p.overrides)
    } else {
      Some(&self.overrides)
    }
  }

  pub fn overrides_mut(&mut self, pnpm: bool) -> &mut BTreeMap<String, Value> {
    if pnpm {
      &mut self.pnpm.get_or_insert_with(PnpmSection::default).overrides
    } else {
      &mut self.overrides
    }
  }

  /// Version of a package in either user-facing table.
  pub fn declared_version(&self, package: &str) -> Option<&str> {
    self
      .dependencies
      .get(package)
      .or_else(|| self.dev_dependencies.get(package))
      .map(String::as_str)
  }

  /// The stored framework hash, if any.
  pub fn framework_hash(&self) -> Option<&str> {
    Some(self.vaadin.hash.as_str()).filter(|h| !h.is_empty())
  }
}

impl DependencyKind {
  pub const ALL: [DependencyKind; 2] = [DependencyKind::Dependencies, DependencyKind::DevDependencies];
}
