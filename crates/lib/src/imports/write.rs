//! Writing generated import files to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ImportsError;
use super::render::GeneratedImports;
use crate::consts::{CHUNKS_DIR, IMPORTS_D_TS_FILE, IMPORTS_FILE};

/// What [`write_generated`] touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
  /// Files whose content changed.
  pub written: Vec<PathBuf>,
  /// Chunk files no longer referenced.
  pub removed: Vec<PathBuf>,
}

fn write_if_changed(path: &Path, content: &str, report: &mut WriteReport) -> Result<(), ImportsError> {
  if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
    return Ok(());
  }
  let write_err = |source| ImportsError::Write {
    path: path.to_path_buf(),
    source,
  };
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(write_err)?;
  }
  fs::write(path, content).map_err(write_err)?;
  debug!(path = ?path, "wrote generated imports");
  report.written.push(path.to_path_buf());
  Ok(())
}

/// Write the generated files into `dir`, leaving unchanged files alone.
///
/// Chunk files from earlier runs that are no longer referenced are removed.
pub fn write_generated(dir: &Path, generated: &GeneratedImports) -> Result<WriteReport, ImportsError> {
  let mut report = WriteReport::default();
  write_if_changed(&dir.join(IMPORTS_FILE), &generated.main, &mut report)?;
  write_if_changed(&dir.join(IMPORTS_D_TS_FILE), &generated.d_ts, &mut report)?;

  let chunks_dir = dir.join(CHUNKS_DIR);
  for (file, content) in &generated.chunks {
    write_if_changed(&chunks_dir.join(file), content, &mut report)?;
  }

  let Ok(entries) = fs::read_dir(&chunks_dir) else {
    return Ok(report);
  };
  for entry in entries.filter_map(Result::ok) {
    let name = entry.file_name().to_string_lossy().into_owned();
    if !name.starts_with("chunk-") || !name.ends_with(".js") || generated.chunks.contains_key(&name) {
      continue;
    }
    let path = entry.path();
    fs::remove_file(&path).map_err(|source| ImportsError::Write {
      path: path.clone(),
      source,
    })?;
    debug!(path = ?path, "removed obsolete chunk");
    report.removed.push(path);
  }

  Ok(report)
}
