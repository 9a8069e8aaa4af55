//! Unit tests for individual components

mod builders_test;
mod config_test;
mod logger_test;
mod runtime_test;
mod util_test;
