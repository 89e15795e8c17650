//! Generation of the frontend import files.
//!
//! The scanned modules and stylesheets are resolved against the project, the
//! packaged resources and `node_modules`, grouped into the eager bundle and
//! lazy chunks ([`ImportPlan`]), and rendered to JavaScript
//! ([`GeneratedImports`]). Unresolvable imports fail generation with the
//! complete list, as does an application theme defined in conflicting
//! locations.

mod chunks;
mod render;
mod resolve;
mod write;

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub use chunks::{ChunkImports, ImportPlan, LazyChunk, ResolvedCss};
pub use render::{GeneratedImports, render};
pub use resolve::{Resolution, Resolved, Resolver, normalize_import, package_name};
pub use write::{WriteReport, write_generated};

use crate::resources::ResourceProvider;
use crate::scanner::DependencyScanner;
use crate::theme::{ThemeError, ThemeResolver};

/// Errors generating import files.
#[derive(Debug, Error)]
pub enum ImportsError {
  /// Declared imports that resolve nowhere; all of them are listed.
  #[error("failed to resolve {} frontend import(s):\n{}", .0.len(), format_missing(.0))]
  MissingResources(Vec<String>),

  #[error(transparent)]
  Theme(#[from] ThemeError),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

fn format_missing(paths: &[String]) -> String {
  paths
    .iter()
    .map(|p| format!("  - {}", p))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Options for [`generate`].
#[derive(Debug, Clone)]
pub struct ImportsOptions {
  pub production: bool,
  pub frontend_dir: PathBuf,
  pub node_modules_dir: PathBuf,
  /// npm packages that resolve bare specifiers without looking at `node_modules`.
  pub known_packages: BTreeSet<String>,
}

/// Resolve, group and render the scanned imports.
///
/// # Errors
///
/// Returns `ImportsError::MissingResources` listing every import that could
/// not be resolved, including files packaged outside the frontend resource
/// root, and `ImportsError::Theme` if the theme is defined in conflicting
/// locations.
pub fn generate(
  scanner: &dyn DependencyScanner,
  options: &ImportsOptions,
  resources: &dyn ResourceProvider,
) -> Result<GeneratedImports, ImportsError> {
  let resolver = Resolver::new(
    &options.frontend_dir,
    &options.node_modules_dir,
    resources,
    &options.known_packages,
  );
  let plan = ImportPlan::build(scanner, &resolver, options.production);
  let mut missing = plan.missing.clone();
  missing.extend(plan.all().filter(|r| !r.is_importable()).map(Resolved::import_path));
  if !missing.is_empty() {
    return Err(ImportsError::MissingResources(missing.into_iter().collect()));
  }
  if let Some(theme) = &plan.theme {
    ThemeResolver::new(&options.frontend_dir, resources).locate(&theme.name)?;
  }

  info!(
    eager = plan.eager.modules.len() + plan.eager.css.len() + plan.eager.scripts.len(),
    lazy_chunks = plan.lazy.len(),
    "generated frontend imports"
  );
  Ok(render(&plan))
}

/// Generate and write the import files into `dir`.
pub fn update_imports(
  scanner: &dyn DependencyScanner,
  options: &ImportsOptions,
  resources: &dyn ResourceProvider,
  dir: &Path,
) -> Result<WriteReport, ImportsError> {
  let generated = generate(scanner, options, resources)?;
  write_generated(dir, &generated)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resources::MemoryResources;
  use crate::scanner::{ChunkEntry, CssImport, ScanResult};
  use std::fs;
  use tempfile::TempDir;

  fn options(temp: &TempDir) -> ImportsOptions {
    ImportsOptions {
      production: false,
      frontend_dir: temp.path().join("frontend"),
      node_modules_dir: temp.path().join("node_modules"),
      known_packages: ["@vaadin/button".to_string()].into_iter().collect(),
    }
  }

  #[test]
  fn missing_imports_are_reported_together() {
    let temp = TempDir::new().unwrap();
    let scan = ScanResult::default().with_chunk(ChunkEntry {
      modules: vec!["./missing-a.js".to_string(), "./missing-b.js".to_string()],
      css: vec![CssImport::new("./missing.css")],
      ..ChunkEntry::default()
    });

    let err = generate(&scan, &options(&temp), &MemoryResources::new()).unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, ImportsError::MissingResources(ref paths) if paths.len() == 3));
    assert!(message.contains("./missing-a.js"));
    assert!(message.contains("./missing-b.js"));
    assert!(message.contains("./missing.css"));
  }

  #[test]
  fn files_outside_frontend_resources_are_not_imported() {
    let temp = TempDir::new().unwrap();
    let resources = MemoryResources::new().with_file("META-INF/resources/styles/legacy.css", "body {}");
    let scan = ScanResult::default().with_chunk(ChunkEntry {
      css: vec![CssImport::new("./styles/legacy.css")],
      ..ChunkEntry::default()
    });

    let err = generate(&scan, &options(&temp), &resources).unwrap_err();

    assert!(matches!(err, ImportsError::MissingResources(ref paths) if paths == &["META-INF/resources/styles/legacy.css"]));
  }

  #[test]
  fn conflicting_theme_locations_fail_generation() {
    let temp = TempDir::new().unwrap();
    let theme_dir = temp.path().join("frontend/themes/app");
    fs::create_dir_all(&theme_dir).unwrap();
    fs::write(theme_dir.join("theme.json"), r#"{"lumoImports":["color"]}"#).unwrap();
    let resources =
      MemoryResources::new().with_file("META-INF/resources/themes/app/theme.json", r#"{"lumoImports":["badge"]}"#);
    let scan = ScanResult::default().with_theme("app");

    let err = generate(&scan, &options(&temp), &resources).unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, ImportsError::Theme(ThemeError::Conflict { ref locations, .. }) if locations.len() == 2));
    assert!(message.contains("META-INF/resources/themes/app"));
    assert!(message.contains(&theme_dir.display().to_string()));
  }

  #[test]
  fn theme_copied_from_a_dependency_is_fine() {
    let temp = TempDir::new().unwrap();
    let theme_dir = temp.path().join("frontend/themes/app");
    fs::create_dir_all(&theme_dir).unwrap();
    fs::write(theme_dir.join("theme.json"), r#"{"lumoImports":["color"]}"#).unwrap();
    let resources =
      MemoryResources::new().with_file("META-INF/resources/themes/app/theme.json", r#"{"lumoImports":["color"]}"#);

    let generated = generate(&ScanResult::default().with_theme("app"), &options(&temp), &resources).unwrap();
    assert!(generated.main.contains("applyTheme(document);"));
  }

  #[test]
  fn writes_main_chunk_and_declaration_files() {
    let temp = TempDir::new().unwrap();
    let frontend = temp.path().join("frontend");
    fs::create_dir_all(frontend.join("views")).unwrap();
    fs::write(frontend.join("views/admin.ts"), "export {}").unwrap();
    let resources = MemoryResources::new().with_file("META-INF/resources/frontend/grid.js", "export {}");
    let scan = ScanResult::default()
      .with_chunk(ChunkEntry {
        modules: vec!["@vaadin/button/vaadin-button.js".to_string(), "./grid.js".to_string()],
        ..ChunkEntry::default()
      })
      .with_chunk(ChunkEntry {
        triggers: vec!["com.example.AdminView".to_string()],
        modules: vec!["./views/admin.ts".to_string()],
        ..ChunkEntry::default()
      });
    let dir = frontend.join("generated/flow");

    let report = update_imports(&scan, &options(&temp), &resources, &dir).unwrap();

    assert_eq!(report.written.len(), 3);
    let main = fs::read_to_string(dir.join("generated-flow-imports.js")).unwrap();
    assert!(main.contains("import '@vaadin/button/vaadin-button.js';"));
    assert!(main.contains("import 'Frontend/generated/jar-resources/grid.js';"));
    assert!(!main.contains("admin.ts"));
    let chunk_files: Vec<_> = fs::read_dir(dir.join("chunks")).unwrap().collect();
    assert_eq!(chunk_files.len(), 1);
  }
}
