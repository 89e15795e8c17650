//! Bundle staleness evaluation.
//!
//! Decides whether the frontend bundle has to be rebuilt by comparing the
//! application as it is now with the stats the last build recorded. Checks
//! run cheapest first and the first one that finds a difference decides.
//!
//! Anything the evaluation can't read or parse is a reason to rebuild. Only
//! a configuration error that a rebuild would hit again, a theme defined in
//! conflicting locations, fails it.

mod deps;
mod imports;
mod result;
mod theme;

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

pub use result::{needs_bundle_build, save_result};
pub use theme::includes;

use crate::consts::LOAD_DEPENDENCIES_ON_STARTUP;
use crate::imports::{ImportPlan, Resolver};
use crate::manifest::{BundleStats, ManifestStore, PackageManifest};
use crate::resources::ResourceProvider;
use crate::scanner::DependencyScanner;
use crate::theme::{ThemeError, ThemeResolver};
use crate::util::hash::ContentHasher;

/// Which bundle is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Development,
  Production,
  /// Served by the frontend dev server; there is no bundle to keep fresh.
  LiveReload,
}

/// Options for [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
  pub mode: Mode,
  /// Rebuild regardless of what the checks say.
  pub force: bool,
  /// Never rebuild a development bundle once one exists.
  pub skip_dev_bundle: bool,
}

/// Where the current frontend sources are read from.
pub struct FrontendSources<'a> {
  pub frontend_dir: &'a Path,
  pub node_modules_dir: &'a Path,
  pub resources: &'a dyn ResourceProvider,
  pub hasher: &'a dyn ContentHasher,
  /// npm packages that resolve bare import specifiers.
  pub known_packages: &'a BTreeSet<String>,
}

/// Why a bundle is considered stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
  Forced,
  NoPreviousBundle,
  EagerLoadingRequested,
  PackageHashMissing,
  DependenciesNotRecorded,
  MissingPackage(String),
  VersionMismatch {
    package: String,
    required: String,
    bundled: String,
  },
  IndexHtmlChanged,
  UnresolvedImport(String),
  MissingImport(String),
  UnretrievableResource(String),
  UnrecordedFrontendFile(String),
  FrontendFileChanged(String),
  IndexFileAdded(String),
  IndexFileDeleted(String),
  ThemeInfoMissing,
  ThemeChanged(String),
  ThemeStylesChanged(String),
  WebComponentMissing(String),
  Unreadable(String),
}

impl fmt::Display for StaleReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StaleReason::Forced => write!(f, "a rebuild was requested"),
      StaleReason::NoPreviousBundle => write!(f, "no previous bundle was found"),
      StaleReason::EagerLoadingRequested => {
        write!(f, "{} requires every chunk to load eagerly", LOAD_DEPENDENCIES_ON_STARTUP)
      }
      StaleReason::PackageHashMissing => write!(f, "package.json has no framework hash"),
      StaleReason::DependenciesNotRecorded => write!(f, "the bundle recorded no package versions"),
      StaleReason::MissingPackage(package) => write!(f, "package '{}' is not in the bundle", package),
      StaleReason::VersionMismatch {
        package,
        required,
        bundled,
      } => write!(f, "package '{}' requires {} but the bundle has {}", package, required, bundled),
      StaleReason::IndexHtmlChanged => write!(f, "index.html changed"),
      StaleReason::UnresolvedImport(import) => write!(f, "import '{}' can't be resolved", import),
      StaleReason::MissingImport(import) => write!(f, "import '{}' is not in the bundle", import),
      StaleReason::UnretrievableResource(path) => {
        write!(f, "resource '{}' is packaged outside the frontend folder", path)
      }
      StaleReason::UnrecordedFrontendFile(path) => write!(f, "frontend file '{}' has no recorded hash", path),
      StaleReason::FrontendFileChanged(path) => write!(f, "frontend file '{}' changed", path),
      StaleReason::IndexFileAdded(file) => write!(f, "entry point '{}' was added", file),
      StaleReason::IndexFileDeleted(file) => write!(f, "entry point '{}' was deleted", file),
      StaleReason::ThemeInfoMissing => write!(f, "the bundle has no theme information"),
      StaleReason::ThemeChanged(name) => write!(f, "theme '{}' changed", name),
      StaleReason::ThemeStylesChanged(path) => write!(f, "theme stylesheet '{}' changed", path),
      StaleReason::WebComponentMissing(tag) => write!(f, "web component '{}' is not exported by the bundle", tag),
      StaleReason::Unreadable(what) => write!(f, "could not read {}", what),
    }
  }
}

/// Outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
  pub needs_build: bool,
  /// The first check that found a difference.
  pub reason: Option<StaleReason>,
}

impl Decision {
  fn fresh() -> Self {
    Self {
      needs_build: false,
      reason: None,
    }
  }

  fn stale(reason: StaleReason) -> Self {
    info!(reason = %reason, "frontend bundle needs to be rebuilt");
    Self {
      needs_build: true,
      reason: Some(reason),
    }
  }
}

/// Load the stats of the previous bundle.
///
/// Read or parse failures count as "no previous bundle".
pub fn load_previous_stats(store: &dyn ManifestStore) -> Option<BundleStats> {
  match store.load_stats() {
    Ok(stats) => stats,
    Err(e) => {
      warn!(error = %e, "ignoring unreadable bundle stats");
      None
    }
  }
}

/// Evaluate whether the bundle must be rebuilt.
///
/// `manifest` is the manifest a package update would produce now, so that
/// its framework hash can be compared with the one the bundle recorded.
///
/// # Errors
///
/// Returns `ThemeError::Conflict` if the application theme exists in the
/// project and in packaged resources with different content. Other theme
/// read failures mark the bundle stale instead.
pub fn evaluate(
  manifest: &PackageManifest,
  previous: Option<&BundleStats>,
  scanner: &dyn DependencyScanner,
  sources: &FrontendSources<'_>,
  options: &CheckOptions,
) -> Result<Decision, ThemeError> {
  if options.mode == Mode::LiveReload {
    debug!("live reload serves sources directly, no bundle to check");
    return Ok(Decision::fresh());
  }
  if options.force {
    return Ok(Decision::stale(StaleReason::Forced));
  }
  let Some(stats) = previous else {
    return Ok(Decision::stale(StaleReason::NoPreviousBundle));
  };
  if options.mode == Mode::Development && options.skip_dev_bundle {
    info!("skipping development bundle checks");
    return Ok(Decision::fresh());
  }
  if options.mode == Mode::Production && !scanner.annotated_classes(LOAD_DEPENDENCIES_ON_STARTUP).is_empty() {
    return Ok(Decision::stale(StaleReason::EagerLoadingRequested));
  }

  match compare(manifest, stats, scanner, sources, options.mode) {
    Ok(Some(reason)) => Ok(Decision::stale(reason)),
    Ok(None) => {
      info!("frontend bundle is up to date");
      Ok(Decision::fresh())
    }
    Err(e @ ThemeError::Conflict { .. }) => Err(e),
    Err(e) => {
      warn!(error = %e, "could not compare the bundle, rebuilding");
      Ok(Decision::stale(StaleReason::Unreadable(e.to_string())))
    }
  }
}

/// Whether the bundle must be rebuilt.
pub fn needs_build(
  manifest: &PackageManifest,
  previous: Option<&BundleStats>,
  scanner: &dyn DependencyScanner,
  sources: &FrontendSources<'_>,
  options: &CheckOptions,
) -> Result<bool, ThemeError> {
  Ok(evaluate(manifest, previous, scanner, sources, options)?.needs_build)
}

fn compare(
  manifest: &PackageManifest,
  stats: &BundleStats,
  scanner: &dyn DependencyScanner,
  sources: &FrontendSources<'_>,
  mode: Mode,
) -> Result<Option<StaleReason>, ThemeError> {
  if let Some(reason) = deps::check(manifest, stats, scanner) {
    return Ok(Some(reason));
  }
  if mode == Mode::Production {
    if let Some(reason) = imports::check_index_html(stats, sources.frontend_dir, sources.hasher) {
      return Ok(Some(reason));
    }
  }

  let resolver = Resolver::new(
    sources.frontend_dir,
    sources.node_modules_dir,
    sources.resources,
    sources.known_packages,
  );
  let plan = ImportPlan::build(scanner, &resolver, mode == Mode::Production);
  if let Some(reason) = imports::check_coverage(&plan, stats) {
    return Ok(Some(reason));
  }
  if let Some(reason) = imports::check_hashes(&plan, stats, sources.frontend_dir, &resolver, sources.hasher) {
    return Ok(Some(reason));
  }

  let themes = ThemeResolver::new(sources.frontend_dir, sources.resources);
  if let Some(reason) = theme::check(scanner, stats, &themes, mode)? {
    return Ok(Some(reason));
  }

  let missing_component = scanner
    .web_components()
    .into_iter()
    .find(|tag| !stats.web_components.contains(tag));
  Ok(missing_component.map(StaleReason::WebComponentMissing))
}
