//! Grouping of resolved imports into the eager bundle and lazy chunks.

use std::collections::BTreeSet;

use tracing::debug;

use super::resolve::{Resolution, Resolved, Resolver};
use crate::consts::LOAD_DEPENDENCIES_ON_STARTUP;
use crate::scanner::{ChunkId, CssImport, DependencyScanner, ThemeDefinition};

/// A stylesheet with its resolved location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCss {
  pub resolved: Resolved,
  pub import: CssImport,
}

impl ResolvedCss {
  /// Injected into the document rather than registered for a component.
  pub fn is_global(&self) -> bool {
    self.import.theme_for.is_none() && self.import.id.is_none()
  }
}

/// Imports of one group, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkImports {
  pub css: Vec<ResolvedCss>,
  pub modules: Vec<Resolved>,
  pub scripts: Vec<Resolved>,
}

impl ChunkImports {
  pub fn is_empty(&self) -> bool {
    self.css.is_empty() && self.modules.is_empty() && self.scripts.is_empty()
  }

  /// Every resolved import of the group.
  pub fn all(&self) -> impl Iterator<Item = &Resolved> {
    self
      .css
      .iter()
      .map(|c| &c.resolved)
      .chain(&self.modules)
      .chain(&self.scripts)
  }

  fn push_css(&mut self, css: ResolvedCss) {
    let duplicate = if css.is_global() {
      self.css.iter().any(|c| c.is_global() && c.resolved == css.resolved)
    } else {
      self.css.contains(&css)
    };
    if !duplicate {
      self.css.push(css);
    }
  }

  fn push_unique(list: &mut Vec<Resolved>, resolved: Resolved) {
    if !list.contains(&resolved) {
      list.push(resolved);
    }
  }

  fn merge(&mut self, other: ChunkImports) {
    for css in other.css {
      self.push_css(css);
    }
    for module in other.modules {
      Self::push_unique(&mut self.modules, module);
    }
    for script in other.scripts {
      Self::push_unique(&mut self.scripts, script);
    }
  }

  /// Move npm imports ahead of project imports, keeping relative order.
  fn order(&mut self) {
    for list in [&mut self.modules, &mut self.scripts] {
      list.sort_by_key(|r| !r.is_npm());
    }
  }

  /// Drop everything that is already part of `eager`.
  fn without(mut self, eager: &ChunkImports) -> Self {
    self.css.retain(|c| !eager.css.contains(c));
    self.modules.retain(|m| !eager.modules.contains(m));
    self.scripts.retain(|s| !eager.scripts.contains(s));
    self
  }
}

/// A lazily loaded group and the trigger classes that load it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyChunk {
  pub id: ChunkId,
  pub imports: ChunkImports,
}

/// Every import of the application, resolved and grouped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
  pub eager: ChunkImports,
  pub lazy: Vec<LazyChunk>,
  pub theme: Option<ThemeDefinition>,
  /// Declared imports that could not be resolved.
  pub missing: BTreeSet<String>,
}

impl ImportPlan {
  /// Resolve and group the scanned imports.
  ///
  /// Development-only modules and scripts are left out for production. With
  /// eager loading requested every chunk is folded into the eager group.
  pub fn build(scanner: &dyn DependencyScanner, resolver: &Resolver<'_>, production: bool) -> Self {
    let eager_all = !scanner.annotated_classes(LOAD_DEPENDENCIES_ON_STARTUP).is_empty();
    let mut plan = ImportPlan {
      theme: scanner.theme().filter(ThemeDefinition::is_named),
      ..Default::default()
    };

    let mut modules = scanner.modules();
    let mut scripts = scanner.scripts();
    if !production {
      for (id, list) in scanner.modules_development() {
        modules.entry(id).or_default().extend(list);
      }
      for (id, list) in scanner.scripts_development() {
        scripts.entry(id).or_default().extend(list);
      }
    }
    let css = scanner.css();

    let ids: BTreeSet<ChunkId> = modules.keys().chain(scripts.keys()).chain(css.keys()).cloned().collect();
    let mut lazy = Vec::new();

    for id in ids {
      let mut group = ChunkImports::default();
      for import in css.get(&id).into_iter().flatten() {
        if let Some(resolved) = plan.lookup(resolver, &import.value) {
          group.push_css(ResolvedCss {
            resolved,
            import: import.clone(),
          });
        }
      }
      for path in modules.get(&id).into_iter().flatten() {
        if let Some(resolved) = plan.lookup(resolver, path) {
          ChunkImports::push_unique(&mut group.modules, resolved);
        }
      }
      for path in scripts.get(&id).into_iter().flatten() {
        if let Some(resolved) = plan.lookup(resolver, path) {
          ChunkImports::push_unique(&mut group.scripts, resolved);
        }
      }

      if id.is_global() || eager_all {
        plan.eager.merge(group);
      } else {
        lazy.push(LazyChunk { id, imports: group });
      }
    }

    plan.eager.order();
    for mut chunk in lazy {
      chunk.imports = chunk.imports.without(&plan.eager);
      chunk.imports.order();
      if chunk.imports.is_empty() {
        debug!(triggers = ?chunk.id, "lazy chunk fully covered by eager imports");
        continue;
      }
      plan.lazy.push(chunk);
    }
    plan
  }

  fn lookup(&mut self, resolver: &Resolver<'_>, import: &str) -> Option<Resolved> {
    match resolver.resolve(import) {
      Resolution::Found(resolved) => Some(resolved),
      Resolution::External => {
        debug!(import = %import, "skipping external import");
        None
      }
      Resolution::Missing => {
        self.missing.insert(import.to_string());
        None
      }
    }
  }

  /// Every resolved import across all groups.
  pub fn all(&self) -> impl Iterator<Item = &Resolved> {
    self.eager.all().chain(self.lazy.iter().flat_map(|c| c.imports.all()))
  }
}
