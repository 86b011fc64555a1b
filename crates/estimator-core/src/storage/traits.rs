//! Storage engine trait definition.
//!
//! The `StorageEngine` trait is the persistence client the services talk to:
//! row-level insert, update, delete and select. Each method is atomic on its
//! own; sequences of calls are not.

use std::path::Path;
use uuid::Uuid;

use super::types::{
    Customer, CustomerFields, DashboardCounts, Estimate, EstimateChanges, EstimateFile,
    EstimateFilter, LineItem, LineItemValues, NewEstimate, NewEstimateFile, NewLineItem, Project,
    ProjectFields,
};
use crate::error::Result;

/// Storage engine interface for estimating data.
///
/// All implementations must ensure:
/// - UUIDs are used for all identifiers
/// - Estimate versions are unique per project
/// - Line items and file records never outlive their estimate
/// - Line items list in `sort_order`, ties in insertion order
pub trait StorageEngine: Send {
    /// Create a new database at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `EstimatorError::Persistence` if the file already exists or
    /// the schema cannot be written.
    fn create(path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Open an existing database.
    ///
    /// # Errors
    ///
    /// Returns `EstimatorError::NotFound` if no database exists at `path`.
    fn open(path: &Path) -> Result<Self>
    where
        Self: Sized;

    // --- Customer operations ---

    fn insert_customer(&mut self, fields: &CustomerFields, created_by: &Uuid) -> Result<Uuid>;

    fn update_customer(&mut self, id: &Uuid, fields: &CustomerFields) -> Result<()>;

    fn get_customer(&self, id: &Uuid) -> Result<Option<Customer>>;

    /// List customers ordered by last name, then first name.
    fn list_customers(&self) -> Result<Vec<Customer>>;

    /// Count projects that reference a customer.
    fn count_customer_projects(&self, customer_id: &Uuid) -> Result<usize>;

    fn delete_customer(&mut self, id: &Uuid) -> Result<()>;

    // --- Project operations ---

    /// Insert a project, assigning the next project number.
    fn insert_project(&mut self, fields: &ProjectFields, created_by: &Uuid) -> Result<Uuid>;

    fn update_project(&mut self, id: &Uuid, fields: &ProjectFields) -> Result<()>;

    fn update_project_description(&mut self, id: &Uuid, description: Option<&str>) -> Result<()>;

    fn get_project(&self, id: &Uuid) -> Result<Option<Project>>;

    /// Look up a project by its human-facing number (e.g. `P-0003`).
    fn get_project_by_number(&self, number: &str) -> Result<Option<Project>>;

    /// List projects, newest first.
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// Delete a project together with its estimates and their line items.
    fn delete_project(&mut self, id: &Uuid) -> Result<()>;

    // --- Estimate operations ---

    /// Insert an estimate with zero totals.
    ///
    /// The version is assigned as 1 + the highest existing version for the
    /// project, in the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns `EstimatorError::NotFound` if the project does not exist.
    fn insert_estimate(&mut self, estimate: &NewEstimate) -> Result<Uuid>;

    fn get_estimate(&self, id: &Uuid) -> Result<Option<Estimate>>;

    /// List estimates, grouped by project and newest version first.
    fn list_estimates(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>>;

    fn update_estimate(&mut self, id: &Uuid, changes: &EstimateChanges) -> Result<()>;

    /// Write the derived total fields.
    fn set_estimate_totals(&mut self, id: &Uuid, total_cost: f64, total_price: f64) -> Result<()>;

    /// Delete the estimate row. The schema cascades to any remaining items.
    fn delete_estimate(&mut self, id: &Uuid) -> Result<()>;

    // --- Line item operations ---

    /// Insert a batch of line items in one transaction, returning their IDs in
    /// input order.
    fn insert_line_items(&mut self, items: &[NewLineItem]) -> Result<Vec<Uuid>>;

    fn get_line_item(&self, id: &Uuid) -> Result<Option<LineItem>>;

    /// List an estimate's items in display order.
    fn list_line_items(&self, estimate_id: &Uuid) -> Result<Vec<LineItem>>;

    /// Highest `sort_order` among an estimate's items, if it has any.
    fn max_sort_order(&self, estimate_id: &Uuid) -> Result<Option<i64>>;

    /// Overwrite the description, proposal text and lump-sum value.
    fn update_line_item(&mut self, id: &Uuid, values: &LineItemValues) -> Result<()>;

    fn set_sort_order(&mut self, id: &Uuid, sort_order: i64) -> Result<()>;

    fn delete_line_item(&mut self, id: &Uuid) -> Result<()>;

    /// Delete every item of an estimate, returning how many were removed.
    fn delete_line_items_for_estimate(&mut self, estimate_id: &Uuid) -> Result<usize>;

    // --- Estimate file operations ---

    /// Record an attachment's metadata.
    ///
    /// # Errors
    ///
    /// Returns `EstimatorError::NotFound` if the estimate does not exist.
    fn insert_estimate_file(&mut self, file: &NewEstimateFile) -> Result<Uuid>;

    fn get_estimate_file(&self, id: &Uuid) -> Result<Option<EstimateFile>>;

    /// List an estimate's attachments, oldest first.
    fn list_estimate_files(&self, estimate_id: &Uuid) -> Result<Vec<EstimateFile>>;

    fn delete_estimate_file(&mut self, id: &Uuid) -> Result<()>;

    // --- Summary operations ---

    /// Count active projects, open estimates and customers.
    fn dashboard_counts(&self) -> Result<DashboardCounts>;

    // --- Maintenance operations ---

    /// Check database integrity and foreign key consistency.
    fn check_integrity(&self) -> Result<()>;
}
