//! Library tests exercising the public API end to end.

mod pipeline_tests;
