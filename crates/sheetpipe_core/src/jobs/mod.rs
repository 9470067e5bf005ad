//! Job model and batch input expansion.
//!
//! This module provides:
//! - `Job`: one input file with its dedicated output directory
//! - `discovery`: expansion of a file/directory input into ordered jobs

mod discovery;
mod types;

pub use discovery::{expand_input, is_supported_input, DiscoveryError, SUPPORTED_EXTS};
pub use types::Job;
