//! UI primitives for the Estimator CLI.
//!
//! This module provides:
//! - **Context**: Environment detection (TTY, width, color, unicode)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Badge tokens and text styles
//! - **Render**: Tables, headers, receipts, hints, key-value lines
//! - **Progress**: Spinner for calls to the AI service
//! - **Format**: String utilities (truncate, wrap, ids, money)
//!
//! # Usage
//!
//! ```ignore
//! use crate::ui::{header, table, Column, OutputMode};
//!
//! let ui_ctx = ctx.ui_context();
//! if ui_ctx.mode.is_json() {
//!     println!("{}", serde_json::to_string_pretty(&value)?);
//!     return Ok(());
//! }
//!
//! println!("{}", header(&ui_ctx, "estimate list", None));
//! println!("{}", table(&ui_ctx, &columns, &rows));
//! ```

mod context;
pub mod format;
mod mode;
pub mod progress;
pub mod render;
pub mod theme;

pub use context::{OutputFlags, UiContext};
pub use mode::OutputMode;
pub use theme::Badge;

pub use render::{
    badge, blank_line, divider, header, hint, kv, print, print_error, receipt, table, Column,
};

pub use progress::Spinner;

pub use format::{format_datetime, money, short_id, single_line, truncate};
