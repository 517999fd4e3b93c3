//! Shared utilities for BullBear
//!
//! Logging setup and the small environment/secret-file helpers used when
//! assembling configuration.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_or, env_parse, read_key_file};
pub use logging::{LogFormat, init_tracing};
