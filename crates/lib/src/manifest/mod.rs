//! The package manifest and bundle stats, and where they are stored.

mod stats;
mod store;
mod types;

pub use stats::BundleStats;
pub use store::{FsManifestStore, ManifestError, ManifestStore, MemoryManifestStore, load_manifest, load_stats, save_manifest};
pub use types::*;
