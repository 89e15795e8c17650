//! The dependency scanner port.
//!
//! Class scanning happens outside this crate. Its result reaches the core
//! through [`DependencyScanner`], which the package reconciler, the staleness
//! evaluator and the import generator all consume. [`ScanResult`] is the
//! serialized form of a scan and the implementation used by the CLI.

mod snapshot;

pub use snapshot::{ChunkEntry, ScanError, ScanResult};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identifies a group of frontend modules that load together.
///
/// The global chunk is always loaded. A lazy chunk is keyed by the set of
/// classes that trigger its loading, so the same set always maps to the same
/// chunk regardless of declaration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkId {
  Global,
  Lazy(BTreeSet<String>),
}

impl ChunkId {
  /// Create a lazy chunk id from trigger class names; no triggers means global.
  pub fn lazy<I, S>(triggers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let triggers: BTreeSet<String> = triggers.into_iter().map(Into::into).collect();
    if triggers.is_empty() {
      ChunkId::Global
    } else {
      ChunkId::Lazy(triggers)
    }
  }

  pub fn is_global(&self) -> bool {
    matches!(self, ChunkId::Global)
  }

  /// Trigger classes of a lazy chunk, empty for the global one.
  pub fn triggers(&self) -> impl Iterator<Item = &str> {
    let set = match self {
      ChunkId::Global => None,
      ChunkId::Lazy(triggers) => Some(triggers),
    };
    set.into_iter().flatten().map(String::as_str)
  }
}

/// A stylesheet declared by a component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssImport {
  /// Import path of the stylesheet.
  pub value: String,
  /// Style modules to include, e.g. `lumo-badge`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub include: Option<String>,
  /// Component tag the styles are registered for.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub theme_for: Option<String>,
  /// Explicit style module id.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
}

impl CssImport {
  pub fn new(value: impl Into<String>) -> Self {
    Self {
      value: value.into(),
      include: None,
      theme_for: None,
      id: None,
    }
  }
}

/// The application theme.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDefinition {
  /// Folder name of the theme, empty for the built-in default.
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub variant: String,
}

impl ThemeDefinition {
  /// Whether a named project or reusable theme is in use.
  pub fn is_named(&self) -> bool {
    !self.name.is_empty()
  }
}

/// Everything the core needs to know about a scanned application.
pub trait DependencyScanner {
  /// npm packages the application requires, name to version.
  fn packages(&self) -> BTreeMap<String, String>;

  /// JavaScript modules per chunk, in declaration order.
  fn modules(&self) -> BTreeMap<ChunkId, Vec<String>>;

  /// Modules only loaded in development mode.
  fn modules_development(&self) -> BTreeMap<ChunkId, Vec<String>> {
    BTreeMap::new()
  }

  /// Plain (non-module) JavaScript files per chunk.
  fn scripts(&self) -> BTreeMap<ChunkId, Vec<String>> {
    BTreeMap::new()
  }

  /// Plain scripts only loaded in development mode.
  fn scripts_development(&self) -> BTreeMap<ChunkId, Vec<String>> {
    BTreeMap::new()
  }

  /// Stylesheets per chunk.
  fn css(&self) -> BTreeMap<ChunkId, Vec<CssImport>>;

  fn theme(&self) -> Option<ThemeDefinition>;

  /// Classes carrying the given marker annotation.
  fn annotated_classes(&self, marker: &str) -> BTreeSet<String>;

  /// Tags of exported web components.
  fn web_components(&self) -> BTreeSet<String> {
    BTreeSet::new()
  }
}
