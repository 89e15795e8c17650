//! Content hashing for change detection.
//!
//! This module provides:
//! - `ContentHash`: a 64-character SHA-256 digest
//! - `ContentHasher`: the hashing port used by the staleness evaluator
//! - `hash_text()`: line-ending independent text hashing
//! - `hash_file()`: hashing a frontend file as text
//! - `hash_directory()`: deterministic hashing of a folder's files
//!
//! Digests recorded by the bundler in `stats.json` are produced with the same
//! algorithm, so the output of this module must stay byte-compatible with them.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

/// A full 64-character SHA-256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error while reading content to hash.
#[derive(Debug, Error)]
pub enum HashError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to walk directory {path}: {message}")]
  WalkDir { path: String, message: String },
}

/// Hashing port.
///
/// Implementations must be deterministic: identical input always yields an
/// identical digest, across processes and machines.
pub trait ContentHasher {
  /// Hash raw bytes.
  fn hash_bytes(&self, data: &[u8]) -> ContentHash;

  /// Hash text after normalizing CRLF line endings to LF.
  fn hash_text(&self, text: &str) -> ContentHash {
    self.hash_bytes(normalize_line_endings(text).as_bytes())
  }

  /// Read a file as text and hash it with [`ContentHasher::hash_text`].
  fn hash_file(&self, path: &Path) -> Result<ContentHash, HashError> {
    let bytes = fs::read(path).map_err(|source| HashError::Read {
      path: path.display().to_string(),
      source,
    })?;
    Ok(self.hash_text(&String::from_utf8_lossy(&bytes)))
  }
}

/// SHA-256 implementation of [`ContentHasher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
  fn hash_bytes(&self, data: &[u8]) -> ContentHash {
    hash_bytes(data)
  }
}

/// Hash arbitrary bytes.
///
/// Returns the full 64-character SHA-256 hash.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(format!("{:x}", hasher.finalize()))
}

/// Hash text with line endings normalized.
pub fn hash_text(text: &str) -> ContentHash {
  Sha256Hasher.hash_text(text)
}

/// Hash a file's contents as text.
pub fn hash_file(path: &Path) -> Result<ContentHash, HashError> {
  Sha256Hasher.hash_file(path)
}

/// Replace every `\r\n` with `\n`.
pub fn normalize_line_endings(text: &str) -> std::borrow::Cow<'_, str> {
  if text.contains("\r\n") {
    std::borrow::Cow::Owned(text.replace("\r\n", "\n"))
  } else {
    std::borrow::Cow::Borrowed(text)
  }
}

/// Compute a deterministic hash of the regular files below `path`.
///
/// Only relative file paths and file contents take part, so two copies of the
/// same folder hash identically regardless of location or timestamps.
///
/// # Errors
///
/// Returns `HashError` if the directory cannot be walked or a file cannot be read.
pub fn hash_directory(path: &Path) -> Result<ContentHash, HashError> {
  let mut entries: Vec<String> = Vec::new();

  for entry in WalkDir::new(path).sort_by_file_name() {
    let entry = entry.map_err(|e| HashError::WalkDir {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let rel_path = entry
      .path()
      .strip_prefix(path)
      .unwrap_or(entry.path())
      .to_string_lossy()
      .replace('\\', "/");
    let content_hash = hash_file(entry.path())?;
    entries.push(format!("F:{}:{}", rel_path, content_hash.0));
  }

  entries.sort();

  let mut hasher = Sha256::new();
  for entry in entries {
    hasher.update(entry.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

  mod text {
    use super::*;

    #[test]
    fn empty_input_has_known_digest() {
      assert_eq!(hash_bytes(b"").0, EMPTY_SHA256);
      assert_eq!(hash_text("").0, EMPTY_SHA256);
    }

    #[test]
    fn hash_is_deterministic() {
      assert_eq!(hash_text("import './a.js';"), hash_text("import './a.js';"));
    }

    #[test]
    fn crlf_and_lf_hash_identically() {
      assert_eq!(hash_text("a\r\nb\r\n"), hash_text("a\nb\n"));
      assert_ne!(hash_bytes(b"a\r\nb"), hash_bytes(b"a\nb"));
    }

    #[test]
    fn lone_carriage_return_is_kept() {
      assert_ne!(hash_text("a\rb"), hash_text("a\nb"));
    }
  }

  mod files {
    use super::*;

    #[test]
    fn file_hash_matches_text_hash() {
      let temp = tempdir().unwrap();
      let path = temp.path().join("view.ts");
      fs::write(&path, "export {};\r\n").unwrap();

      assert_eq!(hash_file(&path).unwrap(), hash_text("export {};\n"));
    }

    #[test]
    fn missing_file_is_an_error() {
      let temp = tempdir().unwrap();
      let err = hash_file(&temp.path().join("missing.ts")).unwrap_err();
      assert!(err.to_string().contains("missing.ts"));
    }
  }

  mod directories {
    use super::*;

    #[test]
    fn same_content_in_different_locations_hashes_equal() {
      let a = tempdir().unwrap();
      let b = tempdir().unwrap();
      for dir in [a.path(), b.path()] {
        fs::create_dir_all(dir.join("components")).unwrap();
        fs::write(dir.join("theme.json"), "{}").unwrap();
        fs::write(dir.join("components/button.css"), ":host {}").unwrap();
      }

      assert_eq!(hash_directory(a.path()).unwrap(), hash_directory(b.path()).unwrap());
    }

    #[test]
    fn changed_file_changes_hash() {
      let temp = tempdir().unwrap();
      fs::write(temp.path().join("styles.css"), "a {}").unwrap();
      let before = hash_directory(temp.path()).unwrap();

      fs::write(temp.path().join("styles.css"), "b {}").unwrap();
      let after = hash_directory(temp.path()).unwrap();

      assert_ne!(before, after);
    }

    #[test]
    fn renamed_file_changes_hash() {
      let temp = tempdir().unwrap();
      fs::write(temp.path().join("a.css"), "x").unwrap();
      let before = hash_directory(temp.path()).unwrap();

      fs::rename(temp.path().join("a.css"), temp.path().join("b.css")).unwrap();
      let after = hash_directory(temp.path()).unwrap();

      assert_ne!(before, after);
    }
  }
}
