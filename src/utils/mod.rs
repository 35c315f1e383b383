//! Utility functions and helpers

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig};
