//! Framework hash over the dependency tables.

use std::path::Path;

use serde_json::json;

use crate::manifest::PackageManifest;
use crate::util::hash::{ContentHash, ContentHasher};

/// Hash of the manifest's `dependencies` and `devDependencies` plus the
/// project location.
///
/// Both tables are sorted maps, so the serialization is canonical. The base
/// directory is rendered with forward slashes so the hash does not depend on
/// the host path separator.
pub fn framework_hash(manifest: &PackageManifest, base_dir: &Path, hasher: &dyn ContentHasher) -> ContentHash {
  let tables = json!({
    "dependencies": manifest.dependencies,
    "devDependencies": manifest.dev_dependencies,
  });
  let base = base_dir.to_string_lossy().replace('\\', "/");
  hasher.hash_text(&format!("{}\n{}", tables, base))
}
