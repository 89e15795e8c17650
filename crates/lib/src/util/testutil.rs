//! Test utilities for flowbuild-lib.
//!
//! [`ProjectFixture`] lays out a throwaway project (frontend folder,
//! `node_modules`, build folder) in a temp directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::util::hash::hash_text;

/// A project on disk that lives as long as the fixture.
pub struct ProjectFixture {
  temp: TempDir,
}

impl ProjectFixture {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("frontend")).unwrap();
    Self { temp }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn frontend_dir(&self) -> PathBuf {
    self.root().join("frontend")
  }

  pub fn node_modules_dir(&self) -> PathBuf {
    self.root().join("node_modules")
  }

  pub fn build_dir(&self) -> PathBuf {
    self.root().join("target")
  }

  /// Write a file relative to the project root, creating parent folders.
  pub fn write(&self, rel: &str, content: &str) -> PathBuf {
    let path = self.root().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
  }

  /// Write a file relative to the frontend folder and return its content hash.
  pub fn write_frontend(&self, rel: &str, content: &str) -> String {
    self.write(&format!("frontend/{}", rel), content);
    hash_text(content).0
  }

  /// Pretend an npm package is installed.
  pub fn install(&self, package: &str) {
    fs::create_dir_all(self.node_modules_dir().join(package)).unwrap();
  }
}

/// Build a set of owned strings.
pub fn set(items: &[&str]) -> BTreeSet<String> {
  items.iter().map(|s| s.to_string()).collect()
}
