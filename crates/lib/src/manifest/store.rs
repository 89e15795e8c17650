//! Reading and writing the package manifest and the bundle stats.
//!
//! [`ManifestStore`] is the seam between the algorithms and the filesystem:
//! [`FsManifestStore`] works on real files, [`MemoryManifestStore`] keeps
//! everything in memory for tests.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use super::stats::BundleStats;
use super::types::PackageManifest;

/// Errors reading or writing a manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The file exists but is not valid JSON for its schema.
  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Storage for the package manifest and the previous bundle's stats.
pub trait ManifestStore {
  /// Load the package manifest, `None` if there is none yet.
  fn load_manifest(&self) -> Result<Option<PackageManifest>, ManifestError>;

  /// Persist the package manifest.
  fn save_manifest(&self, manifest: &PackageManifest) -> Result<(), ManifestError>;

  /// Load the stats of the previous bundle, `None` if no bundle was built.
  fn load_stats(&self) -> Result<Option<BundleStats>, ManifestError>;
}

/// Read a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<String>, ManifestError> {
  match fs::read_to_string(path) {
    Ok(content) => Ok(Some(content)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(source) => Err(ManifestError::Read {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Load a `package.json`.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err(ManifestError::Parse)` naming the file if it is malformed.
pub fn load_manifest(path: &Path) -> Result<Option<PackageManifest>, ManifestError> {
  let Some(content) = read_optional(path)? else {
    return Ok(None);
  };
  let manifest = PackageManifest::from_json(&content).map_err(|source| ManifestError::Parse {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(Some(manifest))
}

/// Write a `package.json` atomically (temp file in the same folder, then rename).
pub fn save_manifest(path: &Path, manifest: &PackageManifest) -> Result<(), ManifestError> {
  let content = manifest.to_json().map_err(ManifestError::Serialize)?;
  let write_err = |source| ManifestError::Write {
    path: path.to_path_buf(),
    source,
  };

  let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
  fs::create_dir_all(dir).map_err(write_err)?;

  let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
  temp.write_all(content.as_bytes()).map_err(write_err)?;
  temp.persist(path).map_err(|e| write_err(e.error))?;

  debug!(path = ?path, "wrote package manifest");
  Ok(())
}

/// Load a bundle `stats.json`.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_stats(path: &Path) -> Result<Option<BundleStats>, ManifestError> {
  let Some(content) = read_optional(path)? else {
    return Ok(None);
  };
  let stats = BundleStats::from_json(&content).map_err(|source| ManifestError::Parse {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(Some(stats))
}

/// Manifest storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsManifestStore {
  package_json: PathBuf,
  stats_json: PathBuf,
}

impl FsManifestStore {
  pub fn new(package_json: impl Into<PathBuf>, stats_json: impl Into<PathBuf>) -> Self {
    Self {
      package_json: package_json.into(),
      stats_json: stats_json.into(),
    }
  }

  pub fn package_json(&self) -> &Path {
    &self.package_json
  }

  pub fn stats_json(&self) -> &Path {
    &self.stats_json
  }
}

impl ManifestStore for FsManifestStore {
  fn load_manifest(&self) -> Result<Option<PackageManifest>, ManifestError> {
    load_manifest(&self.package_json)
  }

  fn save_manifest(&self, manifest: &PackageManifest) -> Result<(), ManifestError> {
    save_manifest(&self.package_json, manifest)
  }

  fn load_stats(&self) -> Result<Option<BundleStats>, ManifestError> {
    load_stats(&self.stats_json)
  }
}

/// In-memory manifest storage.
#[derive(Debug, Default)]
pub struct MemoryManifestStore {
  manifest: RefCell<Option<PackageManifest>>,
  stats: Option<BundleStats>,
  saves: Cell<usize>,
}

impl MemoryManifestStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_manifest(self, manifest: PackageManifest) -> Self {
    self.manifest.replace(Some(manifest));
    self
  }

  pub fn with_stats(mut self, stats: BundleStats) -> Self {
    self.stats = Some(stats);
    self
  }

  /// The manifest as last saved.
  pub fn manifest(&self) -> Option<PackageManifest> {
    self.manifest.borrow().clone()
  }

  /// Number of times the manifest was saved.
  pub fn save_count(&self) -> usize {
    self.saves.get()
  }
}

impl ManifestStore for MemoryManifestStore {
  fn load_manifest(&self) -> Result<Option<PackageManifest>, ManifestError> {
    Ok(self.manifest.borrow().clone())
  }

  fn save_manifest(&self, manifest: &PackageManifest) -> Result<(), ManifestError> {
    self.manifest.replace(Some(manifest.clone()));
    self.saves.set(self.saves.get() + 1);
    Ok(())
  }

  fn load_stats(&self) -> Result<Option<BundleStats>, ManifestError> {
    Ok(self.stats.clone())
  }
}
