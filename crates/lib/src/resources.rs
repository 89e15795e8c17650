//! Access to resources packaged with application dependencies.
//!
//! Components ship frontend files and reusable themes under
//! `META-INF/resources`. Extraction is done elsewhere; the core only needs to
//! read single files and list folders, through [`ResourceProvider`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Read-only view of packaged resources, addressed by `/`-separated paths
/// such as `META-INF/resources/frontend/button.js`.
pub trait ResourceProvider {
  /// Content of a resource, `None` when it does not exist or cannot be read.
  fn read(&self, path: &str) -> Option<Vec<u8>>;

  /// Paths of all files below `prefix`, relative to it and sorted.
  fn list(&self, prefix: &str) -> Vec<String>;

  fn exists(&self, path: &str) -> bool {
    self.read(path).is_some()
  }

  /// Content of a resource as text.
  fn read_string(&self, path: &str) -> Option<String> {
    self.read(path).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
  }
}

/// Resources extracted into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirResources {
  root: PathBuf,
}

impl DirResources {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl ResourceProvider for DirResources {
  fn read(&self, path: &str) -> Option<Vec<u8>> {
    let full = self.root.join(path);
    match fs::read(&full) {
      Ok(bytes) => Some(bytes),
      Err(e) => {
        debug!(path = ?full, error = %e, "packaged resource not readable");
        None
      }
    }
  }

  fn list(&self, prefix: &str) -> Vec<String> {
    let base = self.root.join(prefix);
    let mut files: Vec<String> = WalkDir::new(&base)
      .into_iter()
      .filter_map(Result::ok)
      .filter(|e| e.file_type().is_file())
      .filter_map(|e| {
        e.path()
          .strip_prefix(&base)
          .ok()
          .map(|p| p.to_string_lossy().replace('\\', "/"))
      })
      .collect();
    files.sort();
    files
  }
}

/// In-memory resources, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
  files: BTreeMap<String, Vec<u8>>,
}

impl MemoryResources {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
    self.files.insert(path.to_string(), content.into());
    self
  }
}

impl ResourceProvider for MemoryResources {
  fn read(&self, path: &str) -> Option<Vec<u8>> {
    self.files.get(path).cloned()
  }

  fn list(&self, prefix: &str) -> Vec<String> {
    let prefix = format!("{}/", prefix.trim_end_matches('/'));
    self
      .files
      .keys()
      .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
      .collect()
  }
}

/// A provider with no resources at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl ResourceProvider for NoResources {
  fn read(&self, _path: &str) -> Option<Vec<u8>> {
    None
  }

  fn list(&self, _prefix: &str) -> Vec<String> {
    Vec::new()
  }
}
