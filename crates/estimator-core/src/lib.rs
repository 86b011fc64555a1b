//! # Estimator Core
//!
//! Core library for Estimator - pre-construction estimating for residential
//! construction projects.
//!
//! This crate provides the domain logic, storage abstractions, and data models
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **storage**: Storage engine trait and the SQLite implementation
//! - **service**: Estimate lifecycle, line items, totals, attachments and dashboard counts
//! - **templates**: Built-in line-item templates per project type
//! - **generation**: AI draft and scope-text generation clients
//! - **invalidation**: Change signals for cached views
//! - **auth**: Session and actor resolution

pub mod auth;
pub mod error;
pub mod generation;
pub mod invalidation;
pub mod money;
pub mod service;
pub mod storage;
pub mod templates;

pub use auth::{Actor, Session};
pub use error::{EstimatorError, Result};
pub use service::EstimateService;
pub use storage::StorageEngine;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
