//! Estimate services.
//!
//! [`EstimateService`] owns a storage engine and exposes the operations the
//! CLI (or any other front end) calls. Mutating operations take a
//! [`Session`](crate::auth::Session) and fail with `Auth` before touching
//! storage when nobody is signed in. After each successful mutation the
//! affected views are reported to the configured
//! [`InvalidationSink`](crate::invalidation::InvalidationSink).
//!
//! Each storage call is atomic on its own. Operations made of several calls
//! (template seeding, bulk replace, delete, reorder) are not: a failure part
//! way through leaves the earlier calls applied.

mod customers;
mod dashboard;
mod estimates;
pub mod files;
mod generate;
mod line_items;
mod projects;
pub mod totals;

pub use estimates::EstimateInput;
pub use files::FileInput;
pub use line_items::{BulkMode, LineItemInput, MoveDirection};

use uuid::Uuid;

use crate::error::{EstimatorError, Result};
use crate::invalidation::{Invalidation, InvalidationSink, TracingSink};
use crate::storage::{Estimate, LineItem, Project, StorageEngine};

/// Entry point for customer, project, estimate, line item and attachment
/// operations.
pub struct EstimateService<S: StorageEngine> {
    storage: S,
    sink: Box<dyn InvalidationSink>,
}

impl<S: StorageEngine> EstimateService<S> {
    /// Create a service that logs invalidations through `tracing`.
    pub fn new(storage: S) -> Self {
        Self::with_sink(storage, TracingSink)
    }

    pub fn with_sink(storage: S, sink: impl InvalidationSink + 'static) -> Self {
        Self {
            storage,
            sink: Box::new(sink),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn emit(&self, views: &[Invalidation]) {
        self.sink.invalidate(views);
    }

    fn require_project(&self, id: &Uuid) -> Result<Project> {
        self.storage
            .get_project(id)?
            .ok_or_else(|| EstimatorError::NotFound(format!("Project {} not found", id)))
    }

    fn require_estimate(&self, id: &Uuid) -> Result<Estimate> {
        self.storage
            .get_estimate(id)?
            .ok_or_else(|| EstimatorError::NotFound(format!("Estimate {} not found", id)))
    }

    /// Fetch a line item, failing unless it belongs to `estimate_id`.
    fn require_line_item(&self, estimate_id: &Uuid, id: &Uuid) -> Result<LineItem> {
        match self.storage.get_line_item(id)? {
            Some(item) if item.estimate_id == *estimate_id => Ok(item),
            _ => Err(EstimatorError::NotFound(format!(
                "Line item {} not found in estimate {}",
                id, estimate_id
            ))),
        }
    }
}

/// Trim a required text field, failing with `Validation` when it is blank.
fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EstimatorError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
