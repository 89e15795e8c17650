//! File names, JSON keys and path conventions shared across the crate.

/// The package manager descriptor.
pub const PACKAGE_JSON: &str = "package.json";

/// npm lock file, removed together with `node_modules` on a stale install.
pub const PACKAGE_LOCK_JSON: &str = "package-lock.json";

/// pnpm lock file.
pub const PNPM_LOCK_YAML: &str = "pnpm-lock.yaml";

pub const NODE_MODULES: &str = "node_modules";

/// Name of the optional configuration file in the project directory.
pub const OPTIONS_FILENAME: &str = "flowbuild.json";

/// Bundle statistics file, relative to a bundle folder.
pub const STATS_JSON: &str = "config/stats.json";

/// File persisting the production staleness decision between build steps.
pub const NEEDS_BUILD_FILE: &str = "needs-build";

/// Generated `versions.json` handed to the bundler.
pub const VERSIONS_JSON: &str = "versions.json";

/// Import alias for the project frontend folder.
pub const FRONTEND_ALIAS: &str = "Frontend/";

/// Folder under the frontend directory that holds packaged resources.
pub const JAR_RESOURCES_PATH: &str = "generated/jar-resources/";

/// Folder (relative to the frontend directory) holding the import files.
pub const GENERATED_FLOW_DIR: &str = "generated/flow";

pub const IMPORTS_FILE: &str = "generated-flow-imports.js";

pub const IMPORTS_D_TS_FILE: &str = "generated-flow-imports.d.ts";

/// Lazy chunk folder, relative to the import files.
pub const CHUNKS_DIR: &str = "chunks";

/// Packaged frontend resources root.
pub const RESOURCES_FRONTEND: &str = "META-INF/resources/frontend";

/// Packaged reusable themes root.
pub const RESOURCES_THEMES: &str = "META-INF/resources/themes";

pub const THEMES_DIR: &str = "themes";

pub const THEME_JSON: &str = "theme.json";

pub const INDEX_HTML: &str = "index.html";

/// Entry points whose appearance or disappearance invalidates a bundle.
pub const INDEX_FILES: [&str; 3] = ["index.ts", "index.js", "index.tsx"];

/// Theme key fallbacks used by bundles built without a named theme.
pub const DEV_BUNDLE_THEME_KEY: &str = "dev.bundle";
pub const PROD_BUNDLE_THEME_KEY: &str = "prod.bundle";

/// Legacy alias that is never compared against bundle contents.
pub const FLOW_FRONTEND_PACKAGE: &str = "@vaadin/flow-frontend";

/// Package whose installed version decides whether `node_modules` is stale.
pub const SHRINKWRAP_PACKAGE: &str = "@vaadin/vaadin-shrinkwrap";

/// Umbrella package that is never pinned from the version table.
pub const VAADIN_CORE_PACKAGE: &str = "@vaadin/vaadin-core";

/// Client-side router replaced by the React router in React mode.
pub const VAADIN_ROUTER_PACKAGE: &str = "@vaadin/router";

/// Annotation marker forcing every lazy chunk to load eagerly.
pub const LOAD_DEPENDENCIES_ON_STARTUP: &str = "LoadDependenciesOnStartup";

/// Skeleton manifest defaults.
pub const DEFAULT_PACKAGE_NAME: &str = "no-name";
pub const DEFAULT_LICENSE: &str = "UNLICENSED";
pub const DEFAULT_MODULE_TYPE: &str = "module";
