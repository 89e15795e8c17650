//! Import coverage and frontend file hashes.

use std::collections::BTreeSet;
use std::path::Path;

use super::StaleReason;
use crate::consts::{INDEX_FILES, INDEX_HTML, JAR_RESOURCES_PATH, THEMES_DIR};
use crate::imports::{ImportPlan, Resolved, Resolver, normalize_import};
use crate::manifest::BundleStats;
use crate::util::hash::ContentHasher;

/// Every import the application needs must be part of the bundle.
///
/// Files packaged outside the frontend resource root can't be compared
/// reliably and always count as stale.
pub(super) fn check_coverage(plan: &ImportPlan, stats: &BundleStats) -> Option<StaleReason> {
  if let Some(missing) = plan.missing.iter().next() {
    return Some(StaleReason::UnresolvedImport(missing.clone()));
  }

  let bundled: BTreeSet<String> = stats.bundle_imports.iter().map(String::as_str).map(normalize_import).collect();
  for resolved in plan.all() {
    if let Resolved::ResourceRoot(rel) = resolved {
      return Some(StaleReason::UnretrievableResource(rel.clone()));
    }
    let import = resolved.import_path();
    if !bundled.contains(&normalize_import(&import)) {
      return Some(StaleReason::MissingImport(import));
    }
  }
  None
}

fn compare(
  key: &str,
  resolved: &Resolved,
  recorded: &str,
  resolver: &Resolver<'_>,
  hasher: &dyn ContentHasher,
) -> Option<StaleReason> {
  let Some(content) = resolver.read(resolved) else {
    return Some(StaleReason::Unreadable(key.to_string()));
  };
  (hasher.hash_text(&content).as_str() != recorded).then(|| StaleReason::FrontendFileChanged(key.to_string()))
}

/// Resolved form of a `frontendHashes` key.
fn resolved_key(key: &str) -> Resolved {
  match key.strip_prefix(JAR_RESOURCES_PATH) {
    Some(rel) => Resolved::Packaged(rel.to_string()),
    None => Resolved::Project(key.to_string()),
  }
}

/// Content of every frontend file the bundle depends on must be unchanged.
///
/// Checks, in order: files reached through imports, the index entry points,
/// and the remaining recorded hashes whose file still exists.
pub(super) fn check_hashes(
  plan: &ImportPlan,
  stats: &BundleStats,
  frontend_dir: &Path,
  resolver: &Resolver<'_>,
  hasher: &dyn ContentHasher,
) -> Option<StaleReason> {
  let mut checked = BTreeSet::new();

  for resolved in plan.all() {
    let Some(key) = resolved.hash_key() else {
      continue;
    };
    if !checked.insert(key.clone()) {
      continue;
    }
    let Some(recorded) = stats.frontend_hash(&key) else {
      return Some(StaleReason::UnrecordedFrontendFile(key));
    };
    if let Some(reason) = compare(&key, resolved, recorded, resolver, hasher) {
      return Some(reason);
    }
  }

  for index in INDEX_FILES {
    checked.insert(index.to_string());
    let exists = frontend_dir.join(index).is_file();
    match (exists, stats.frontend_hash(index)) {
      (true, None) => return Some(StaleReason::IndexFileAdded(index.to_string())),
      (false, Some(_)) => return Some(StaleReason::IndexFileDeleted(index.to_string())),
      (true, Some(recorded)) => {
        if let Some(reason) = compare(index, &resolved_key(index), recorded, resolver, hasher) {
          return Some(reason);
        }
      }
      (false, None) => {}
    }
  }

  let themes_prefix = format!("{}/", THEMES_DIR);
  for (key, recorded) in &stats.frontend_hashes {
    if checked.contains(key) || key == INDEX_HTML || key.starts_with(&themes_prefix) {
      continue;
    }
    let resolved = resolved_key(key);
    let Some(content) = resolver.read(&resolved) else {
      continue;
    };
    if hasher.hash_text(&content).as_str() != recorded {
      return Some(StaleReason::FrontendFileChanged(key.clone()));
    }
  }
  None
}

/// A custom `index.html` must match the one the production bundle was built with.
pub(super) fn check_index_html(
  stats: &BundleStats,
  frontend_dir: &Path,
  hasher: &dyn ContentHasher,
) -> Option<StaleReason> {
  let path = frontend_dir.join(INDEX_HTML);
  if !path.is_file() {
    return None;
  }
  let current = hasher.hash_file(&path).ok();
  match (current, stats.frontend_hash(INDEX_HTML)) {
    (Some(current), Some(recorded)) if current.as_str() == recorded => None,
    _ => Some(StaleReason::IndexHtmlChanged),
  }
}
