//! Application-level utilities for the Estimator CLI.
//!
//! This module provides:
//! - Application context for unified CLI + config handling
//! - Path resolution for config and database files
//! - Session resolution for the acting user

mod context;
mod resolver;

pub use context::{AppContext, Service};
pub use resolver::resolve_config_path;
