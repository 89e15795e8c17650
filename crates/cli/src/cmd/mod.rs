mod check;
mod imports;
mod reconcile;

pub use check::cmd_check;
pub use imports::cmd_imports;
pub use reconcile::cmd_reconcile;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use flowbuild_lib::consts::OPTIONS_FILENAME;
use flowbuild_lib::manifest::PackageManifest;
use flowbuild_lib::options::{Options, ProjectLayout};
use flowbuild_lib::packages::{PlatformVersions, ReconcileOptions};
use flowbuild_lib::resources::{DirResources, NoResources, ResourceProvider};
use flowbuild_lib::scanner::{DependencyScanner, ScanResult};

/// A project directory with its options resolved.
pub struct Project {
  pub options: Options,
  pub layout: ProjectLayout,
}

impl Project {
  /// Load `flowbuild.json` (or `config`) for the project in `dir`.
  ///
  /// A missing default options file means default options; a missing
  /// explicit `config` is an error.
  pub fn load(dir: &Path, config: Option<&Path>) -> Result<Self> {
    let dir = dunce::canonicalize(dir).with_context(|| format!("Project directory not found: {}", dir.display()))?;
    let config_path = config.map_or_else(|| dir.join(OPTIONS_FILENAME), Path::to_path_buf);

    let options = match Options::load(&config_path).context("Failed to load options")? {
      Some(options) => options,
      None if config.is_some() => bail!("Config file not found: {}", config_path.display()),
      None => Options::default(),
    };
    debug!(project = ?dir, options = ?options, "loaded project options");

    let layout = options.layout(&dir);
    Ok(Self { options, layout })
  }

  /// Packaged resources, empty when no resources folder is configured.
  pub fn resources(&self) -> Box<dyn ResourceProvider> {
    match &self.layout.resources_dir {
      Some(dir) => Box::new(DirResources::new(dir)),
      None => Box::new(NoResources),
    }
  }

  /// The platform version table; `versions` overrides the configured file.
  pub fn platform(&self, versions: Option<&Path>) -> Result<PlatformVersions> {
    let path = versions.map(Path::to_path_buf).or_else(|| self.layout.versions_file.clone());
    let Some(path) = path else {
      return Ok(PlatformVersions::default());
    };
    PlatformVersions::load(
      &path,
      self.options.react_enabled,
      self.options.exclude_web_components,
    )
    .with_context(|| format!("Failed to load platform versions: {}", path.display()))
  }

  pub fn reconcile_options(&self) -> ReconcileOptions {
    ReconcileOptions {
      base_dir: self.layout.npm_folder.clone(),
      react_enabled: self.options.react_enabled,
      exclude_web_components: self.options.exclude_web_components,
      pnpm_enabled: self.options.pnpm_enabled,
    }
  }
}

/// Read a scanner snapshot.
pub fn load_scan(path: &Path) -> Result<ScanResult> {
  ScanResult::load(path).with_context(|| format!("Failed to load scan result: {}", path.display()))
}

/// Packages that bare import specifiers may resolve to.
pub fn known_packages(manifest: &PackageManifest, scan: &ScanResult) -> BTreeSet<String> {
  manifest
    .dependencies
    .keys()
    .chain(manifest.dev_dependencies.keys())
    .cloned()
    .chain(scan.packages().into_keys())
    .collect()
}
