//! Parsing and validation of `ladder.toml` bench configuration files.
//!
//! This crate reads the bench configuration and produces a strongly-typed
//! [`LadderConfig`] holding the design parameters of the block under test,
//! drive-loop settings, and log settings. Every section is optional; missing
//! values take the defaults of the reference design.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE_NAME,
};
pub use types::*;
