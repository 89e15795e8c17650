//! Theme discovery.
//!
//! A theme lives either in the project (`<frontend>/themes/<name>`) or in a
//! dependency as a reusable theme (`META-INF/resources/themes/<name>`). Its
//! `theme.json` may name a `parent`, which is resolved the same way.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::consts::{RESOURCES_THEMES, THEME_JSON, THEMES_DIR};
use crate::resources::ResourceProvider;
use crate::util::hash::{ContentHash, HashError, hash_bytes, hash_directory, hash_file, hash_text};

/// Errors resolving themes.
#[derive(Debug, Error)]
pub enum ThemeError {
  /// The same theme exists in more than one place with different content.
  #[error("theme '{name}' is defined in conflicting locations:\n{}", format_locations(.locations))]
  Conflict { name: String, locations: Vec<String> },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error(transparent)]
  Hash(#[from] HashError),
}

fn format_locations(locations: &[String]) -> String {
  locations
    .iter()
    .map(|l| format!("  - {}", l))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Where a theme folder was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeLocation {
  Project(PathBuf),
  /// Resource prefix, e.g. `META-INF/resources/themes/shared`.
  Packaged(String),
}

/// A theme in a parent chain, with its parsed `theme.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
  pub name: String,
  pub location: ThemeLocation,
  pub config: Value,
}

/// Looks themes up in the project and in packaged resources.
pub struct ThemeResolver<'a> {
  frontend_dir: &'a Path,
  resources: &'a dyn ResourceProvider,
}

impl<'a> ThemeResolver<'a> {
  pub fn new(frontend_dir: &'a Path, resources: &'a dyn ResourceProvider) -> Self {
    Self { frontend_dir, resources }
  }

  /// Find the folder of a theme.
  ///
  /// # Errors
  ///
  /// Returns `ThemeError::Conflict` if the theme exists both in the project and
  /// in packaged resources with different files.
  pub fn locate(&self, name: &str) -> Result<Option<ThemeLocation>, ThemeError> {
    let project_dir = self.frontend_dir.join(THEMES_DIR).join(name);
    let prefix = format!("{}/{}", RESOURCES_THEMES, name);
    let packaged_files = self.resources.list(&prefix);

    match (project_dir.is_dir(), packaged_files.is_empty()) {
      (false, true) => Ok(None),
      (true, true) => Ok(Some(ThemeLocation::Project(project_dir))),
      (false, false) => Ok(Some(ThemeLocation::Packaged(prefix))),
      (true, false) => {
        if hash_directory(&project_dir)? == self.hash_packaged(&prefix, &packaged_files) {
          debug!(theme = %name, "theme copied from a dependency, using project copy");
          Ok(Some(ThemeLocation::Project(project_dir)))
        } else {
          Err(ThemeError::Conflict {
            name: name.to_string(),
            locations: vec![project_dir.display().to_string(), prefix],
          })
        }
      }
    }
  }

  /// Hash packaged files the same way [`hash_directory`] hashes a folder.
  fn hash_packaged(&self, prefix: &str, files: &[String]) -> ContentHash {
    let mut entries: Vec<String> = files
      .iter()
      .filter_map(|file| {
        let content = self.resources.read_string(&format!("{}/{}", prefix, file))?;
        Some(format!("F:{}:{}", file, hash_text(&content).0))
      })
      .collect();
    entries.sort();
    let joined: String = entries.iter().map(|e| format!("{}\n", e)).collect();
    hash_bytes(joined.as_bytes())
  }

  /// Read `theme.json` of a located theme; `None` if the theme has none.
  pub fn read_config(&self, location: &ThemeLocation) -> Result<Option<Value>, ThemeError> {
    let (label, content) = match location {
      ThemeLocation::Project(dir) => {
        let path = dir.join(THEME_JSON);
        match fs::read_to_string(&path) {
          Ok(content) => (path.display().to_string(), content),
          Err(_) => return Ok(None),
        }
      }
      ThemeLocation::Packaged(prefix) => {
        let path = format!("{}/{}", prefix, THEME_JSON);
        match self.resources.read_string(&path) {
          Some(content) => (path, content),
          None => return Ok(None),
        }
      }
    };

    serde_json::from_str(&content)
      .map(Some)
      .map_err(|source| ThemeError::Parse { path: label, source })
  }

  /// Resolve a theme and its parents, child first.
  ///
  /// Themes without a `theme.json` end the chain; a parent that cannot be
  /// found or that was already visited ends it as well.
  pub fn chain(&self, name: &str) -> Result<Vec<ResolvedTheme>, ThemeError> {
    let mut chain = Vec::new();
    let mut visited = BTreeSet::new();
    let mut next = Some(name.to_string());

    while let Some(name) = next.take() {
      if !visited.insert(name.clone()) {
        debug!(theme = %name, "theme parent cycle");
        break;
      }
      let Some(location) = self.locate(&name)? else {
        debug!(theme = %name, "theme not found");
        break;
      };
      let Some(config) = self.read_config(&location)? else {
        break;
      };

      next = config.get("parent").and_then(Value::as_str).map(str::to_string);
      chain.push(ResolvedTheme { name, location, config });
    }

    Ok(chain)
  }

  /// Hashes of `components/*.css` of a theme, keyed `themes/<name>/components/<file>`.
  pub fn component_styles(&self, theme: &ResolvedTheme) -> Result<BTreeMap<String, String>, ThemeError> {
    let key = |file: &str| format!("{}/{}/components/{}", THEMES_DIR, theme.name, file);
    let mut styles = BTreeMap::new();

    match &theme.location {
      ThemeLocation::Project(dir) => {
        let Ok(entries) = fs::read_dir(dir.join("components")) else {
          return Ok(styles);
        };
        for entry in entries.filter_map(Result::ok) {
          let path = entry.path();
          if path.is_file() && path.extension().is_some_and(|e| e == "css") {
            let file = entry.file_name().to_string_lossy().into_owned();
            styles.insert(key(&file), hash_file(&path)?.0);
          }
        }
      }
      ThemeLocation::Packaged(prefix) => {
        let components = format!("{}/components", prefix);
        for file in self.resources.list(&components) {
          if file.contains('/') || !file.ends_with(".css") {
            continue;
          }
          if let Some(content) = self.resources.read_string(&format!("{}/{}", components, file)) {
            styles.insert(key(&file), hash_text(&content).0);
          }
        }
      }
    }

    Ok(styles)
  }
}
