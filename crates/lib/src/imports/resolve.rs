//! Resolution of import paths declared by components.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::consts::{FRONTEND_ALIAS, JAR_RESOURCES_PATH, RESOURCES_FRONTEND};
use crate::resources::ResourceProvider;

/// Root of packaged static resources, above the `frontend` folder.
const RESOURCES_ROOT: &str = "META-INF/resources";

/// Where an import was found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resolved {
  /// File in the project frontend folder, relative to it.
  Project(String),
  /// File packaged with a dependency, relative to its frontend root.
  Packaged(String),
  /// File packaged outside the frontend root, relative to `META-INF/resources`.
  /// Served as a static resource but never copied into `jar-resources`, so
  /// import files can't reference it.
  ResourceRoot(String),
  /// npm specifier, kept verbatim.
  Npm(String),
}

impl Resolved {
  /// Path as written in a generated import statement.
  ///
  /// A [`Resolved::ResourceRoot`] file has no such path; its packaged
  /// location is returned for error messages.
  pub fn import_path(&self) -> String {
    match self {
      Resolved::Project(rel) => format!("{}{}", FRONTEND_ALIAS, rel),
      Resolved::Packaged(rel) => format!("{}{}{}", FRONTEND_ALIAS, JAR_RESOURCES_PATH, rel),
      Resolved::ResourceRoot(rel) => format!("{}/{}", RESOURCES_ROOT, rel),
      Resolved::Npm(spec) => spec.clone(),
    }
  }

  pub fn is_importable(&self) -> bool {
    !matches!(self, Resolved::ResourceRoot(_))
  }

  /// Key of the file in the bundle's `frontendHashes`, for files the bundle hashes.
  pub fn hash_key(&self) -> Option<String> {
    match self {
      Resolved::Project(rel) => Some(rel.clone()),
      Resolved::Packaged(rel) => Some(format!("{}{}", JAR_RESOURCES_PATH, rel)),
      Resolved::ResourceRoot(_) | Resolved::Npm(_) => None,
    }
  }

  pub fn is_npm(&self) -> bool {
    matches!(self, Resolved::Npm(_))
  }
}

/// Outcome of resolving one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  Found(Resolved),
  /// Absolute URL, loaded by the browser and not bundled.
  External,
  Missing,
}

/// Strip a `?query` suffix.
fn strip_query(path: &str) -> &str {
  path.split_once('?').map_or(path, |(p, _)| p)
}

/// Bundle-relative form of an import, used to compare against recorded imports.
///
/// `Frontend/views/a.ts?inline`, `./views/a.ts` and `views/a.ts` all normalize
/// to `views/a.ts`.
pub fn normalize_import(path: &str) -> String {
  let path = strip_query(path.trim());
  let path = path
    .strip_prefix(FRONTEND_ALIAS)
    .or_else(|| path.strip_prefix("./"))
    .unwrap_or(path);
  path.to_string()
}

/// npm package name of a bare specifier: `@scope/name` or `name`.
pub fn package_name(specifier: &str) -> &str {
  let mut end = 0;
  let segments = if specifier.starts_with('@') { 2 } else { 1 };
  for (i, segment) in specifier.split('/').take(segments).enumerate() {
    end += segment.len() + usize::from(i > 0);
  }
  &specifier[..end]
}

/// Looks imports up in the project, packaged resources and `node_modules`.
pub struct Resolver<'a> {
  frontend_dir: &'a Path,
  node_modules_dir: &'a Path,
  resources: &'a dyn ResourceProvider,
  known_packages: &'a BTreeSet<String>,
}

impl<'a> Resolver<'a> {
  pub fn new(
    frontend_dir: &'a Path,
    node_modules_dir: &'a Path,
    resources: &'a dyn ResourceProvider,
    known_packages: &'a BTreeSet<String>,
  ) -> Self {
    Self {
      frontend_dir,
      node_modules_dir,
      resources,
      known_packages,
    }
  }

  /// Resolve a declared import.
  ///
  /// `./x` and `Frontend/x` are local: project file first, then files copied
  /// from dependencies, then packaged resources. Other specifiers are npm
  /// imports when their package is known, and local files otherwise.
  pub fn resolve(&self, import: &str) -> Resolution {
    let path = strip_query(import.trim());
    if path.starts_with("http:") || path.starts_with("https:") || path.starts_with("//") {
      return Resolution::External;
    }

    let local = path.starts_with("./") || path.starts_with(FRONTEND_ALIAS);
    let rel = normalize_import(path);
    if !local {
      let package = package_name(path);
      if self.known_packages.contains(package) || self.node_modules_dir.join(package).is_dir() {
        return Resolution::Found(Resolved::Npm(path.to_string()));
      }
    }

    self.resolve_local(&rel).map_or(Resolution::Missing, Resolution::Found)
  }

  fn resolve_local(&self, rel: &str) -> Option<Resolved> {
    if let Some(packaged) = rel.strip_prefix(JAR_RESOURCES_PATH) {
      return self.resolve_packaged(packaged);
    }
    if self.frontend_dir.join(rel).is_file() {
      return Some(Resolved::Project(rel.to_string()));
    }
    self.resolve_packaged(rel).or_else(|| {
      self
        .resources
        .exists(&format!("{}/{}", RESOURCES_ROOT, rel))
        .then(|| Resolved::ResourceRoot(rel.to_string()))
    })
  }

  fn resolve_packaged(&self, rel: &str) -> Option<Resolved> {
    let copied = self.frontend_dir.join(JAR_RESOURCES_PATH).join(rel).is_file();
    let packaged = self.resources.exists(&format!("{}/{}", RESOURCES_FRONTEND, rel));
    (copied || packaged).then(|| Resolved::Packaged(rel.to_string()))
  }

  /// Current content of a resolved file, `None` for npm imports or unreadable files.
  pub fn read(&self, resolved: &Resolved) -> Option<String> {
    match resolved {
      Resolved::Project(rel) => fs::read_to_string(self.frontend_dir.join(rel)).ok(),
      Resolved::Packaged(rel) => fs::read_to_string(self.frontend_dir.join(JAR_RESOURCES_PATH).join(rel))
        .ok()
        .or_else(|| self.resources.read_string(&format!("{}/{}", RESOURCES_FRONTEND, rel))),
      Resolved::ResourceRoot(rel) => self.resources.read_string(&format!("{}/{}", RESOURCES_ROOT, rel)),
      Resolved::Npm(_) => None,
    }
  }
}
