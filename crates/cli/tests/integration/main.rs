//! CLI integration tests, one module per subcommand.

mod common;

mod check_tests;
mod imports_tests;
mod reconcile_tests;
