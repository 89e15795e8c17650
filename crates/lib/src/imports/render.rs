//! JavaScript text of the generated import files.

use std::collections::{BTreeMap, BTreeSet};

use super::chunks::{ChunkImports, ImportPlan, ResolvedCss};
use crate::consts::CHUNKS_DIR;
use crate::util::hash::hash_text;

const THEME_IMPORT: &str = "import { applyTheme } from 'Frontend/generated/theme.js';";
const INJECT_IMPORT: &str = "import { injectGlobalCss } from 'Frontend/generated/jar-resources/theme-util.js';";
const REGISTER_IMPORT: &str = "import { css, unsafeCSS, registerStyles } from '@vaadin/vaadin-themable-mixin';";

/// Rendered files, before they are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedImports {
  /// `generated-flow-imports.js`
  pub main: String,
  /// Chunk file name to content.
  pub chunks: BTreeMap<String, String>,
  /// `generated-flow-imports.d.ts`
  pub d_ts: String,
}

fn css_lines(css: &[ResolvedCss], lines: &mut Vec<String>) {
  if css.iter().any(ResolvedCss::is_global) {
    lines.push(INJECT_IMPORT.to_string());
  }
  if css.iter().any(|c| !c.is_global()) {
    lines.push(REGISTER_IMPORT.to_string());
  }

  for (i, entry) in css.iter().enumerate() {
    let var = format!("$cssFromFile_{}", i);
    lines.push(format!("import {} from '{}?inline';", var, entry.resolved.import_path()));
    if entry.is_global() {
      lines.push(format!("injectGlobalCss({}.toString(), 'CSSImport end', document);", var));
      continue;
    }

    let mut options = Vec::new();
    if let Some(include) = &entry.import.include {
      options.push(format!("include: '{}'", include));
    }
    let module_id = entry.import.id.clone().unwrap_or_else(|| format!("flow_css_mod_{}", i));
    options.push(format!("moduleId: '{}'", module_id));
    lines.push(format!(
      "registerStyles('{}', css`${{unsafeCSS({})}}`, {{{}}});",
      entry.import.theme_for.as_deref().unwrap_or(""),
      var,
      options.join(", ")
    ));
  }
}

/// Import statements of a group: stylesheets, then modules, then scripts.
fn group_lines(group: &ChunkImports) -> Vec<String> {
  let mut lines = Vec::new();
  css_lines(&group.css, &mut lines);
  for resolved in group.modules.iter().chain(&group.scripts) {
    lines.push(format!("import '{}';", resolved.import_path()));
  }
  lines
}

fn join(lines: &[String]) -> String {
  let mut text = lines.join("\n");
  text.push('\n');
  text
}

/// Render the main file and the lazy chunk files of a plan.
///
/// Chunk files are named after the hash of their content, so groups with the
/// same imports share one file. Each trigger class gets a lookup entry keyed by
/// the hash of its name.
pub fn render(plan: &ImportPlan) -> GeneratedImports {
  let mut chunks = BTreeMap::new();
  let mut lookups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

  for chunk in &plan.lazy {
    let content = join(&group_lines(&chunk.imports));
    let file = format!("chunk-{}.js", hash_text(&content));
    for trigger in chunk.id.triggers() {
      lookups.entry(hash_text(trigger).0).or_default().insert(file.clone());
    }
    chunks.insert(file, content);
  }

  let mut lines = Vec::new();
  if plan.theme.is_some() {
    lines.push(THEME_IMPORT.to_string());
    lines.push("applyTheme(document);".to_string());
  }
  lines.extend(group_lines(&plan.eager));

  lines.push(String::new());
  lines.push("const loadOnDemand = (key) => {".to_string());
  lines.push("  const pending = [];".to_string());
  for (key, files) in &lookups {
    lines.push(format!("  if (key === '{}') {{", key));
    for file in files {
      lines.push(format!("    pending.push(import('./{}/{}'));", CHUNKS_DIR, file));
    }
    lines.push("  }".to_string());
  }
  lines.push("  return Promise.all(pending);".to_string());
  lines.push("}".to_string());
  lines.push(String::new());
  lines.push("window.Vaadin = window.Vaadin || {};".to_string());
  lines.push("window.Vaadin.Flow = window.Vaadin.Flow || {};".to_string());
  lines.push("window.Vaadin.Flow.loadOnDemand = loadOnDemand;".to_string());

  GeneratedImports {
    main: join(&lines),
    chunks,
    d_ts: "export {}\n".to_string(),
  }
}
