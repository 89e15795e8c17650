//! Theme configuration and theme stylesheet comparison.

use serde_json::Value;
use tracing::debug;

use super::{Mode, StaleReason};
use crate::consts::{DEV_BUNDLE_THEME_KEY, PROD_BUNDLE_THEME_KEY, THEMES_DIR};
use crate::manifest::BundleStats;
use crate::scanner::{DependencyScanner, ThemeDefinition};
use crate::theme::{ThemeError, ThemeResolver};

/// Whether `bundle` contains everything in `project`.
///
/// Objects may carry extra keys in the bundle, at any depth. Arrays must hold
/// matching elements in any order. Anything else must be equal.
pub fn includes(bundle: &Value, project: &Value) -> bool {
  match (bundle, project) {
    (Value::Object(bundle), Value::Object(project)) => project
      .iter()
      .all(|(key, value)| bundle.get(key).is_some_and(|b| includes(b, value))),
    (Value::Array(bundle), Value::Array(project)) => {
      covers(bundle, project) && (bundle.len() == project.len() || covers(project, bundle))
    }
    (bundle, project) => bundle == project,
  }
}

/// Every element of `wanted` is included by some element of `from`.
fn covers(from: &[Value], wanted: &[Value]) -> bool {
  wanted.iter().all(|w| from.iter().any(|f| includes(f, w)))
}

/// Whether a theme configuration says anything beyond naming its parent.
fn has_settings(config: &Value) -> bool {
  config
    .as_object()
    .is_some_and(|object| object.keys().any(|key| key != "parent"))
}

/// Compare the project theme, its parents, and their component styles with
/// what the bundle recorded.
pub(super) fn check(
  scanner: &dyn DependencyScanner,
  stats: &BundleStats,
  themes: &ThemeResolver<'_>,
  mode: Mode,
) -> Result<Option<StaleReason>, ThemeError> {
  let Some(theme) = scanner.theme().filter(ThemeDefinition::is_named) else {
    return Ok(None);
  };
  let chain = themes.chain(&theme.name)?;
  if chain.is_empty() {
    debug!(theme = %theme.name, "theme has no configuration to compare");
    return Ok(None);
  }
  let Some(contents) = &stats.theme_json_contents else {
    return Ok(Some(StaleReason::ThemeInfoMissing));
  };

  let fallback = match mode {
    Mode::Production => PROD_BUNDLE_THEME_KEY,
    Mode::Development | Mode::LiveReload => DEV_BUNDLE_THEME_KEY,
  };

  for (i, resolved) in chain.iter().enumerate() {
    let recorded = contents
      .get(&resolved.name)
      .or_else(|| (i == 0).then(|| contents.get(fallback)).flatten());
    let Some(recorded) = recorded else {
      if i == 0 || has_settings(&resolved.config) {
        return Ok(Some(StaleReason::ThemeChanged(resolved.name.clone())));
      }
      continue;
    };

    let matches = serde_json::from_str::<Value>(recorded).is_ok_and(|bundle| includes(&bundle, &resolved.config));
    if !matches {
      return Ok(Some(StaleReason::ThemeChanged(resolved.name.clone())));
    }
  }

  for resolved in &chain {
    let styles = themes.component_styles(resolved)?;
    for (key, hash) in &styles {
      if stats.frontend_hash(key) != Some(hash.as_str()) {
        return Ok(Some(StaleReason::ThemeStylesChanged(key.clone())));
      }
    }

    let prefix = format!("{}/{}/components/", THEMES_DIR, resolved.name);
    let deleted = stats
      .frontend_hashes
      .keys()
      .find(|key| key.starts_with(&prefix) && !styles.contains_key(*key));
    if let Some(key) = deleted {
      return Ok(Some(StaleReason::ThemeStylesChanged(key.clone())));
    }
  }

  Ok(None)
}
