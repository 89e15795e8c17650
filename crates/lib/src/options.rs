//! Project configuration.
//!
//! Options come from an optional `flowbuild.json` next to the project and
//! from command-line flags. Paths left unset fall back to the conventional
//! layout; relative paths are resolved against the project directory.
//!
//! # Format
//!
//! ```json
//! {
//!   "frontendDirectory": "src/main/frontend",
//!   "reactEnabled": false,
//!   "pnpmEnabled": true
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bundle::Mode;
use crate::consts::{GENERATED_FLOW_DIR, NEEDS_BUILD_FILE, NODE_MODULES, PACKAGE_JSON, STATS_JSON, VERSIONS_JSON};

/// Errors loading the options file.
#[derive(Debug, Error)]
pub enum OptionsError {
  #[error("failed to read options file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse options file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Layout and behaviour settings for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
  /// Folder holding `package.json` and `node_modules`.
  pub npm_folder: Option<PathBuf>,
  pub frontend_directory: Option<PathBuf>,
  /// Folder for build outputs such as the `needs-build` marker.
  pub build_directory: Option<PathBuf>,
  /// Folder with extracted packaged resources (`META-INF/resources/...`).
  pub resources_directory: Option<PathBuf>,
  pub dev_bundle_directory: Option<PathBuf>,
  pub prod_bundle_directory: Option<PathBuf>,
  /// Platform `versions.json` with pinned package versions.
  pub versions_file: Option<PathBuf>,
  pub react_enabled: bool,
  pub pnpm_enabled: bool,
  pub exclude_web_components: bool,
  pub force_production_build: bool,
  pub skip_dev_bundle: bool,
  /// Remove `node_modules` and the lock file on every package update.
  pub clean_npm_files: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      npm_folder: None,
      frontend_directory: None,
      build_directory: None,
      resources_directory: None,
      dev_bundle_directory: None,
      prod_bundle_directory: None,
      versions_file: None,
      react_enabled: true,
      pnpm_enabled: false,
      exclude_web_components: false,
      force_production_build: false,
      skip_dev_bundle: false,
      clean_npm_files: false,
    }
  }
}

impl Options {
  /// Load options from the given path.
  ///
  /// Returns `Ok(None)` if the file doesn't exist.
  /// Returns `Err` if the file exists but couldn't be read or parsed.
  pub fn load(path: &Path) -> Result<Option<Self>, OptionsError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(source) => {
        return Err(OptionsError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    let options = serde_json::from_str(&content).map_err(|source| OptionsError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Some(options))
  }

  /// Resolve all paths against `project_dir`.
  pub fn layout(&self, project_dir: &Path) -> ProjectLayout {
    let resolve = |value: &Option<PathBuf>, default: &str| match value {
      Some(p) if p.is_absolute() => p.clone(),
      Some(p) => project_dir.join(p),
      None => project_dir.join(default),
    };

    ProjectLayout {
      project_dir: project_dir.to_path_buf(),
      npm_folder: resolve(&self.npm_folder, ""),
      frontend_dir: resolve(&self.frontend_directory, "src/main/frontend"),
      build_dir: resolve(&self.build_directory, "target"),
      resources_dir: self.resources_directory.as_ref().map(|_| resolve(&self.resources_directory, "")),
      dev_bundle_dir: resolve(&self.dev_bundle_directory, "src/main/dev-bundle"),
      prod_bundle_dir: resolve(&self.prod_bundle_directory, "src/main/bundles/prod.bundle"),
      versions_file: self.versions_file.as_ref().map(|_| resolve(&self.versions_file, "")),
    }
  }
}

/// Absolute locations of everything the core reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
  pub project_dir: PathBuf,
  pub npm_folder: PathBuf,
  pub frontend_dir: PathBuf,
  pub build_dir: PathBuf,
  pub resources_dir: Option<PathBuf>,
  pub dev_bundle_dir: PathBuf,
  pub prod_bundle_dir: PathBuf,
  pub versions_file: Option<PathBuf>,
}

impl ProjectLayout {
  pub fn package_json(&self) -> PathBuf {
    self.npm_folder.join(PACKAGE_JSON)
  }

  pub fn node_modules(&self) -> PathBuf {
    self.npm_folder.join(NODE_MODULES)
  }

  /// Folder of the generated import files.
  pub fn generated_flow_dir(&self) -> PathBuf {
    self.frontend_dir.join(GENERATED_FLOW_DIR)
  }

  /// Bundle folder evaluated for the given mode.
  pub fn bundle_dir(&self, mode: Mode) -> &Path {
    match mode {
      Mode::Production => &self.prod_bundle_dir,
      Mode::Development | Mode::LiveReload => &self.dev_bundle_dir,
    }
  }

  pub fn stats_json(&self, mode: Mode) -> PathBuf {
    self.bundle_dir(mode).join(STATS_JSON)
  }

  pub fn needs_build_file(&self) -> PathBuf {
    self.build_dir.join(NEEDS_BUILD_FILE)
  }

  /// Generated `versions.json` handed to the bundler.
  pub fn generated_versions_json(&self) -> PathBuf {
    self.build_dir.join(VERSIONS_JSON)
  }
}
