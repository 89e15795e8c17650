//! Shared utilities.
//!
//! Content hashing, plus fixtures for tests.

pub mod hash;

#[cfg(test)]
pub mod testutil;
