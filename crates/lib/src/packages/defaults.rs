//! Packages every application gets, whether components ask for them or not.

use std::collections::{BTreeMap, BTreeSet};

/// Default dependency table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultDependencies {
  pub dependencies: BTreeMap<String, String>,
  pub dev_dependencies: BTreeMap<String, String>,
  /// Packages only wanted when React routing is enabled.
  pub react_only: BTreeSet<String>,
}

const DEPENDENCIES: &[(&str, &str)] = &[
  ("@polymer/polymer", "3.5.2"),
  ("@vaadin/common-frontend", "0.0.19"),
  ("construct-style-sheets-polyfill", "3.1.0"),
  ("date-fns", "2.29.3"),
  ("lit", "3.2.1"),
  ("react", "18.3.1"),
  ("react-dom", "18.3.1"),
  ("react-router-dom", "6.26.2"),
];

const DEV_DEPENDENCIES: &[(&str, &str)] = &[
  ("@types/react", "18.3.11"),
  ("@types/react-dom", "18.3.1"),
  ("@vitejs/plugin-react", "4.3.3"),
  ("glob", "10.4.5"),
  ("rollup-plugin-visualizer", "5.12.0"),
  ("typescript", "5.6.3"),
  ("vite", "5.4.10"),
  ("workbox-build", "7.1.1"),
];

const REACT_ONLY: &[&str] = &[
  "@types/react",
  "@types/react-dom",
  "@vitejs/plugin-react",
  "react",
  "react-dom",
  "react-router-dom",
];

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
  entries
    .iter()
    .map(|(name, version)| (name.to_string(), version.to_string()))
    .collect()
}

impl DefaultDependencies {
  /// The built-in defaults.
  pub fn builtin() -> Self {
    Self {
      dependencies: table(DEPENDENCIES),
      dev_dependencies: table(DEV_DEPENDENCIES),
      react_only: REACT_ONLY.iter().map(|s| s.to_string()).collect(),
    }
  }

  /// Defaults applicable in the given mode.
  pub fn for_mode(&self, react_enabled: bool) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let keep = |map: &BTreeMap<String, String>| -> BTreeMap<String, String> {
      map
        .iter()
        .filter(|(name, _)| react_enabled || !self.react_only.contains(*name))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
    };
    (keep(&self.dependencies), keep(&self.dev_dependencies))
  }
}
