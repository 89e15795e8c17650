//! Removal of a stale npm/pnpm installation.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use super::PackagesError;
use crate::consts::{NODE_MODULES, PACKAGE_JSON, PACKAGE_LOCK_JSON, PNPM_LOCK_YAML, SHRINKWRAP_PACKAGE};
use crate::manifest::PackageManifest;
use crate::version::satisfies;

/// Version of the installed shrinkwrap marker package, if any.
fn installed_shrinkwrap(npm_folder: &Path) -> Option<String> {
  let path = npm_folder.join(NODE_MODULES).join(SHRINKWRAP_PACKAGE).join(PACKAGE_JSON);
  let content = fs::read_to_string(&path).ok()?;
  let json: Value = serde_json::from_str(&content).ok()?;
  json.get("version").and_then(Value::as_str).map(str::to_string)
}

fn remove_path(path: &Path) -> Result<(), PackagesError> {
  let result = if path.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };
  match result {
    Ok(()) => {
      debug!(path = ?path, "removed");
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(source) => Err(PackagesError::Cleanup {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Remove `node_modules` and the lock file when the installation is stale.
///
/// The installation is stale when the installed shrinkwrap package does not
/// match the version the manifest declares for it. `force` removes the files
/// regardless. Returns whether anything was cleaned.
pub fn clean_stale_install(
  npm_folder: &Path,
  manifest: &PackageManifest,
  pnpm: bool,
  force: bool,
) -> Result<bool, PackagesError> {
  let stale = match (manifest.declared_version(SHRINKWRAP_PACKAGE), installed_shrinkwrap(npm_folder)) {
    (Some(declared), Some(installed)) => !satisfies(declared, &installed),
    _ => false,
  };
  if !stale && !force {
    return Ok(false);
  }

  info!(folder = ?npm_folder, forced = force, "removing installed packages");
  remove_path(&npm_folder.join(NODE_MODULES))?;
  let lock = if pnpm { PNPM_LOCK_YAML } else { PACKAGE_LOCK_JSON };
  remove_path(&npm_folder.join(lock))?;
  Ok(true)
}
