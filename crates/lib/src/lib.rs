//! flowbuild-lib: frontend build orchestration for server-side web applications
//!
//! This crate decides what the frontend build of an application needs:
//! - `packages`: reconcile `package.json` with the npm packages the code declares
//! - `bundle`: decide whether a previously built bundle is still usable
//! - `imports`: generate the JavaScript files that import every frontend resource
//!
//! Scanning the compiled application is outside this crate; its results come
//! in through the `scanner::DependencyScanner` trait.

pub mod bundle;
pub mod consts;
pub mod imports;
pub mod manifest;
pub mod options;
pub mod packages;
pub mod resources;
pub mod scanner;
pub mod theme;
pub mod util;
pub mod version;
