//! External stage processor handling.
//!
//! This module provides:
//! - `resolve`: PATH resolution of every required binary, up front,
//!   with typed environment errors
//! - `invoker`: blocking invocation of one processor with captured
//!   diagnostics
//!
//! Tool paths are explicit configuration threaded through `Context`;
//! nothing here reads ambient global state, so pipelines stay
//! independently testable with distinct tool sets.

mod invoker;
mod resolve;

pub use invoker::{run_tool, InvokeError};
pub use resolve::{
    find_in_path, resolve_tools, EnvironmentError, ResolvedTools, ToolKind,
};
