//! Configuration management for sheetpipe.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Validation on load with automatic defaults
//!
//! Tool overrides live in `[tools]` and are passed explicitly into the
//! resolver and invoker at construction - there is no ambient global
//! state, so pipelines remain independently testable with distinct
//! configurations.
//!
//! # Example
//!
//! ```no_run
//! use sheetpipe_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new("sheetpipe.toml");
//! config.load_or_create().unwrap();
//! println!("Output folder: {}", config.settings().paths.output_folder);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{LocatorSettings, LoggingSettings, PathSettings, Settings, ToolSettings};
