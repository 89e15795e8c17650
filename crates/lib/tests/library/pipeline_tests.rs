//! A build as the surrounding tooling runs it: reconcile packages, generate
//! imports, record what the bundler built, then ask whether to rebuild.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use flowbuild_lib::bundle::{
  CheckOptions, FrontendSources, Mode, StaleReason, evaluate, load_previous_stats, needs_bundle_build, save_result,
};
use flowbuild_lib::imports::{ImportsOptions, update_imports};
use flowbuild_lib::manifest::{BundleStats, FsManifestStore, ManifestStore, PackageManifest};
use flowbuild_lib::packages::{
  DefaultDependencies, PackageUpdateOptions, PlatformVersions, ReconcileOptions, effective_manifest, update_packages,
};
use flowbuild_lib::resources::NoResources;
use flowbuild_lib::scanner::{ChunkEntry, DependencyScanner, ScanResult};
use flowbuild_lib::util::hash::{Sha256Hasher, hash_text};

const MAIN_VIEW: &str = "export class MainView extends HTMLElement {}\n";

struct Project {
  temp: TempDir,
  scan: ScanResult,
}

impl Project {
  fn new() -> Self {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("frontend/views")).unwrap();
    fs::write(temp.path().join("frontend/views/main.ts"), MAIN_VIEW).unwrap();
    let scan = ScanResult::default()
      .with_package("lit", "3.2.1")
      .with_chunk(ChunkEntry {
        modules: vec!["lit".to_string(), "./views/main.ts".to_string()],
        ..ChunkEntry::default()
      });
    Self { temp, scan }
  }

  fn root(&self) -> &Path {
    self.temp.path()
  }

  fn store(&self) -> FsManifestStore {
    FsManifestStore::new(
      self.root().join("package.json"),
      self.root().join("bundle/config/stats.json"),
    )
  }

  fn reconcile_options(&self) -> ReconcileOptions {
    ReconcileOptions {
      base_dir: self.root().to_path_buf(),
      react_enabled: false,
      exclude_web_components: false,
      pnpm_enabled: false,
    }
  }

  fn known(&self, manifest: &PackageManifest) -> BTreeSet<String> {
    manifest.dependencies.keys().cloned().collect()
  }

  /// Record stats the way the bundler does after a successful build.
  fn record_build(&self, manifest: &PackageManifest) {
    let stats = BundleStats {
      package_json_hash: manifest.framework_hash().map(str::to_string),
      package_json_dependencies: Some(manifest.dependencies.clone()),
      bundle_imports: vec!["lit".to_string(), "Frontend/views/main.ts".to_string()],
      frontend_hashes: [("views/main.ts".to_string(), hash_text(MAIN_VIEW).0)].into_iter().collect(),
      ..BundleStats::default()
    };
    let path = self.root().join("bundle/config/stats.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, serde_json::to_string_pretty(&stats).unwrap()).unwrap();
  }

  fn check(&self, mode: Mode) -> Option<StaleReason> {
    let store = self.store();
    let current = store.load_manifest().unwrap();
    let manifest = effective_manifest(
      current.as_ref(),
      &self.scan.packages(),
      &PlatformVersions::default(),
      &DefaultDependencies::builtin(),
      &self.reconcile_options(),
    );
    let previous = load_previous_stats(&store);
    let (frontend, node_modules) = (self.root().join("frontend"), self.root().join("node_modules"));
    let known = self.known(&manifest);
    let sources = FrontendSources {
      frontend_dir: &frontend,
      node_modules_dir: &node_modules,
      resources: &NoResources,
      hasher: &Sha256Hasher,
      known_packages: &known,
    };
    let options = CheckOptions {
      mode,
      force: false,
      skip_dev_bundle: false,
    };
    evaluate(&manifest, previous.as_ref(), &self.scan, &sources, &options)
      .unwrap()
      .reason
  }
}

#[test]
fn reconcile_generate_build_and_check() {
  let project = Project::new();
  assert_eq!(project.check(Mode::Development), Some(StaleReason::NoPreviousBundle));

  let update = update_packages(
    &project.store(),
    &project.scan,
    &PlatformVersions::default(),
    &DefaultDependencies::builtin(),
    &PackageUpdateOptions {
      reconcile: project.reconcile_options(),
      clean_npm_files: false,
      versions_json: None,
    },
  )
  .unwrap();
  assert!(update.modified);
  assert_eq!(update.manifest.dependencies.get("lit").map(String::as_str), Some("3.2.1"));

  let report = update_imports(
    &project.scan,
    &ImportsOptions {
      production: false,
      frontend_dir: project.root().join("frontend"),
      node_modules_dir: project.root().join("node_modules"),
      known_packages: project.known(&update.manifest),
    },
    &NoResources,
    &project.root().join("frontend/generated/flow"),
  )
  .unwrap();
  assert!(!report.written.is_empty());
  let main = fs::read_to_string(project.root().join("frontend/generated/flow/generated-flow-imports.js")).unwrap();
  assert!(main.contains("import 'Frontend/views/main.ts';"));

  project.record_build(&update.manifest);
  assert_eq!(project.check(Mode::Development), None);

  fs::write(project.root().join("frontend/views/main.ts"), "export {}\n").unwrap();
  assert_eq!(
    project.check(Mode::Development),
    Some(StaleReason::FrontendFileChanged("views/main.ts".to_string()))
  );
}

#[test]
fn production_decision_survives_until_read() {
  let project = Project::new();
  let build_dir = project.root().join("target");

  assert_eq!(project.check(Mode::Production), Some(StaleReason::NoPreviousBundle));
  save_result(&build_dir, false).unwrap();

  assert!(!needs_bundle_build(&build_dir));
  // Consumed by the first read
  assert!(needs_bundle_build(&build_dir));
}
