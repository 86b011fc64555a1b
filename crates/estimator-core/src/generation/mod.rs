//! AI-assisted draft and scope generation.
//!
//! The [`DraftGenerator`] trait is the seam between the estimate services and
//! the external text generator. [`OpenAiGenerator`] talks to any
//! OpenAI-compatible chat completions endpoint.

pub mod client;
mod prompt;
pub mod sanitize;
pub mod types;

pub use client::{GeneratorConfig, OpenAiGenerator};
pub use types::{DraftLineItem, DraftRequest, ScopeRequest};

use crate::error::Result;

/// External text generator for estimate content.
pub trait DraftGenerator {
    /// Produce an ordered list of sanitized line items for a project.
    fn draft_line_items(&self, request: &DraftRequest) -> Result<Vec<DraftLineItem>>;

    /// Produce scope-of-work text for a single line item.
    fn scope_text(&self, request: &ScopeRequest) -> Result<String>;
}
