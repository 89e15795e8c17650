//! Persisting the production staleness decision between build steps.
//!
//! The decision is taken early in a production build and consumed later by
//! the step that runs the bundler, so it is kept in a file in the build folder.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::consts::NEEDS_BUILD_FILE;

/// Record whether the production bundle needs a build.
pub fn save_result(build_dir: &Path, needs_build: bool) -> io::Result<()> {
  fs::create_dir_all(build_dir)?;
  let path = build_dir.join(NEEDS_BUILD_FILE);
  fs::write(&path, needs_build.to_string())?;
  debug!(path = ?path, needs_build, "saved bundle decision");
  Ok(())
}

/// Read and consume the recorded decision.
///
/// Without a record, or with an unreadable one, a build is needed.
pub fn needs_bundle_build(build_dir: &Path) -> bool {
  let path = build_dir.join(NEEDS_BUILD_FILE);
  let Ok(content) = fs::read_to_string(&path) else {
    return true;
  };
  if let Err(e) = fs::remove_file(&path) {
    debug!(path = ?path, error = %e, "could not remove bundle decision");
  }
  content.trim().parse().unwrap_or(true)
}
