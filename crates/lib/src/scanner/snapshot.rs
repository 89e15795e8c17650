//! Serialized scanner output.
//!
//! # Format
//!
//! ```json
//! {
//!   "packages": { "@vaadin/button": "24.4.0" },
//!   "chunks": [
//!     { "modules": ["@vaadin/button/vaadin-button.js"], "css": [{ "value": "./styles.css" }] },
//!     { "triggers": ["com.example.AdminView"], "modules": ["./admin-view.ts"] }
//!   ],
//!   "theme": { "name": "my-theme" },
//!   "annotatedClasses": { "LoadDependenciesOnStartup": ["com.example.Eager"] },
//!   "webComponents": ["my-widget"]
//! }
//! ```
//!
//! A chunk without triggers is the global chunk. Entries sharing a trigger set
//! are merged in file order.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ChunkId, CssImport, DependencyScanner, ThemeDefinition};

/// Errors loading a scan snapshot.
#[derive(Debug, Error)]
pub enum ScanError {
  #[error("failed to read scan result {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse scan result {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// One chunk as written by the scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkEntry {
  pub triggers: Vec<String>,
  pub modules: Vec<String>,
  pub modules_development: Vec<String>,
  pub scripts: Vec<String>,
  pub scripts_development: Vec<String>,
  pub css: Vec<CssImport>,
}

impl ChunkEntry {
  pub fn id(&self) -> ChunkId {
    ChunkId::lazy(self.triggers.iter().cloned())
  }
}

/// A complete scan, usable wherever a [`DependencyScanner`] is expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResult {
  pub packages: BTreeMap<String, String>,
  pub chunks: Vec<ChunkEntry>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub theme: Option<ThemeDefinition>,
  pub annotated_classes: BTreeMap<String, BTreeSet<String>>,
  pub web_components: BTreeSet<String>,
}

impl ScanResult {
  /// Load a scan snapshot from a JSON file.
  pub fn load(path: &Path) -> Result<Self, ScanError> {
    let content = fs::read_to_string(path).map_err(|source| ScanError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ScanError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Add a package requirement.
  pub fn with_package(mut self, name: &str, version: &str) -> Self {
    self.packages.insert(name.to_string(), version.to_string());
    self
  }

  /// Append a chunk entry.
  pub fn with_chunk(mut self, chunk: ChunkEntry) -> Self {
    self.chunks.push(chunk);
    self
  }

  pub fn with_theme(mut self, name: &str) -> Self {
    self.theme = Some(ThemeDefinition {
      name: name.to_string(),
      variant: String::new(),
    });
    self
  }

  fn collect<T: Clone>(&self, field: impl Fn(&ChunkEntry) -> &Vec<T>) -> BTreeMap<ChunkId, Vec<T>> {
    let mut result: BTreeMap<ChunkId, Vec<T>> = BTreeMap::new();
    for chunk in &self.chunks {
      let items = field(chunk);
      if items.is_empty() {
        continue;
      }
      result.entry(chunk.id()).or_default().extend(items.iter().cloned());
    }
    result
  }
}

impl DependencyScanner for ScanResult {
  fn packages(&self) -> BTreeMap<String, String> {
    self.packages.clone()
  }

  fn modules(&self) -> BTreeMap<ChunkId, Vec<String>> {
    self.collect(|c| &c.modules)
  }

  fn modules_development(&self) -> BTreeMap<ChunkId, Vec<String>> {
    self.collect(|c| &c.modules_development)
  }

  fn scripts(&self) -> BTreeMap<ChunkId, Vec<String>> {
    self.collect(|c| &c.scripts)
  }

  fn scripts_development(&self) -> BTreeMap<ChunkId, Vec<String>> {
    self.collect(|c| &c.scripts_development)
  }

  fn css(&self) -> BTreeMap<ChunkId, Vec<CssImport>> {
    self.collect(|c| &c.css)
  }

  fn theme(&self) -> Option<ThemeDefinition> {
    self.theme.clone()
  }

  fn annotated_classes(&self, marker: &str) -> BTreeSet<String> {
    self.annotated_classes.get(marker).cloned().unwrap_or_default()
  }

  fn web_components(&self) -> BTreeSet<String> {
    self.web_components.clone()
  }
}
