//! SQLite storage backend.
//!
//! One connection guarded by a mutex. Each trait method runs in its own
//! transaction; foreign keys are enforced so deleting an estimate (or a
//! project) cascades to its line items and file records.

mod row;
mod schema;

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EstimatorError, Result};
use crate::storage::traits::StorageEngine;
use crate::storage::types::{
    Customer, CustomerFields, DashboardCounts, Estimate, EstimateChanges, EstimateFile,
    EstimateFilter, EstimateStatus, LineItem, LineItemValues, NewEstimate, NewEstimateFile,
    NewLineItem, Project, ProjectFields, ProjectStatus, LUMP_SUM_UNIT,
};

use row::{
    CustomerRow, EstimateFileRow, EstimateRow, LineItemRow, ProjectRow, CUSTOMER_COLUMNS,
    ESTIMATE_COLUMNS, ESTIMATE_FILE_COLUMNS, LINE_ITEM_COLUMNS, PROJECT_COLUMNS,
};
use schema::{FORMAT_VERSION, SCHEMA};

/// SQLite storage engine.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn empty_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// `?, ?, ...` with one placeholder per value.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn row_exists(tx: &Transaction<'_>, table: &str, id: &Uuid) -> Result<bool> {
    let sql = format!("SELECT id FROM {} WHERE id = ?", table);
    let found: Option<String> = tx
        .query_row(&sql, [id.to_string()], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

impl SqliteStorage {
    /// Open a fresh in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EstimatorError::Persistence("SQLite connection poisoned".to_string()))
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        let created_at = now();
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?, ?)",
            ["format_version", FORMAT_VERSION],
        )?;
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?, ?)",
            ["created_at", created_at.as_str()],
        )?;
        Ok(())
    }

    /// Recorded schema format version.
    pub fn format_version(&self) -> Result<String> {
        let conn = self.lock_conn()?;
        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }
}

impl StorageEngine for SqliteStorage {
    fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(EstimatorError::Persistence(format!(
                "Database already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::initialize(&conn)?;
        debug!(path = %path.display(), "created database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EstimatorError::NotFound(format!(
                "No database at {}",
                path.display()
            )));
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'format_version'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|_| {
                EstimatorError::Persistence(format!(
                    "{} is not an estimator database",
                    path.display()
                ))
            })?;
        if version.as_deref() != Some(FORMAT_VERSION) {
            return Err(EstimatorError::Persistence(format!(
                "Unsupported database format at {}",
                path.display()
            )));
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // --- Customer operations ---

    fn insert_customer(&mut self, fields: &CustomerFields, created_by: &Uuid) -> Result<Uuid> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let id = Uuid::new_v4();
        let timestamp = now();
        tx.execute(
            "INSERT INTO customers (id, first_name, last_name, email, phone, address, city, \
             state, zip, notes, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id.to_string(),
                fields.first_name.trim(),
                fields.last_name.trim(),
                empty_to_none(&fields.email),
                empty_to_none(&fields.phone),
                empty_to_none(&fields.address),
                empty_to_none(&fields.city),
                empty_to_none(&fields.state),
                empty_to_none(&fields.zip),
                empty_to_none(&fields.notes),
                created_by.to_string(),
                timestamp,
                timestamp,
            ],
        )?;

        tx.commit()?;
        Ok(id)
    }

    fn update_customer(&mut self, id: &Uuid, fields: &CustomerFields) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE customers SET first_name = ?, last_name = ?, email = ?, phone = ?, \
             address = ?, city = ?, state = ?, zip = ?, notes = ?, updated_at = ? WHERE id = ?",
            params![
                fields.first_name.trim(),
                fields.last_name.trim(),
                empty_to_none(&fields.email),
                empty_to_none(&fields.phone),
                empty_to_none(&fields.address),
                empty_to_none(&fields.city),
                empty_to_none(&fields.state),
                empty_to_none(&fields.zip),
                empty_to_none(&fields.notes),
                now(),
                id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(EstimatorError::NotFound(format!("Customer {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn get_customer(&self, id: &Uuid) -> Result<Option<Customer>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM customers WHERE id = ?", CUSTOMER_COLUMNS);
        let row = conn
            .query_row(&sql, [id.to_string()], CustomerRow::read)
            .optional()?;
        row.map(Customer::try_from).transpose()
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM customers ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE",
            CUSTOMER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], CustomerRow::read)?;

        let mut customers = Vec::new();
        for row in rows {
            customers.push(Customer::try_from(row?)?);
        }
        Ok(customers)
    }

    fn count_customer_projects(&self, customer_id: &Uuid) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE customer_id = ?",
            [customer_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn delete_customer(&mut self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM customers WHERE id = ?", [id.to_string()])?;
        if removed == 0 {
            return Err(EstimatorError::NotFound(format!("Customer {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    // --- Project operations ---

    fn insert_project(&mut self, fields: &ProjectFields, created_by: &Uuid) -> Result<Uuid> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        if let Some(customer_id) = fields.customer_id {
            if !row_exists(&tx, "customers", &customer_id)? {
                return Err(EstimatorError::NotFound(format!(
                    "Customer {} not found",
                    customer_id
                )));
            }
        }

        let next_number: i64 = tx.query_row(
            "SELECT COALESCE(MAX(CAST(SUBSTR(project_number, 3) AS INTEGER)), 0) + 1 FROM projects",
            [],
            |row| row.get(0),
        )?;
        let project_number = format!("P-{:04}", next_number);

        let id = Uuid::new_v4();
        let timestamp = now();
        tx.execute(
            "INSERT INTO projects (id, project_number, name, customer_id, status, project_type, \
             description, address, city, state, zip, estimated_value, contract_value, notes, \
             created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id.to_string(),
                project_number,
                fields.name.trim(),
                fields.customer_id.map(|c| c.to_string()),
                fields.status.as_str(),
                fields.project_type.as_str(),
                empty_to_none(&fields.description),
                empty_to_none(&fields.address),
                empty_to_none(&fields.city),
                empty_to_none(&fields.state),
                empty_to_none(&fields.zip),
                fields.estimated_value,
                fields.contract_value,
                empty_to_none(&fields.notes),
                created_by.to_string(),
                timestamp,
                timestamp,
            ],
        )?;

        tx.commit()?;
        debug!(%id, %project_number, "inserted project");
        Ok(id)
    }

    fn update_project(&mut self, id: &Uuid, fields: &ProjectFields) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        if let Some(customer_id) = fields.customer_id {
            if !row_exists(&tx, "customers", &customer_id)? {
                return Err(EstimatorError::NotFound(format!(
                    "Customer {} not found",
                    customer_id
                )));
            }
        }

        let changed = tx.execute(
            "UPDATE projects SET name = ?, customer_id = ?, status = ?, project_type = ?, \
             description = ?, address = ?, city = ?, state = ?, zip = ?, estimated_value = ?, \
             contract_value = ?, notes = ?, updated_at = ? WHERE id = ?",
            params![
                fields.name.trim(),
                fields.customer_id.map(|c| c.to_string()),
                fields.status.as_str(),
                fields.project_type.as_str(),
                empty_to_none(&fields.description),
                empty_to_none(&fields.address),
                empty_to_none(&fields.city),
                empty_to_none(&fields.state),
                empty_to_none(&fields.zip),
                fields.estimated_value,
                fields.contract_value,
                empty_to_none(&fields.notes),
                now(),
                id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(EstimatorError::NotFound(format!("Project {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn update_project_description(&mut self, id: &Uuid, description: Option<&str>) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let description = description.filter(|d| !d.trim().is_empty());
        let changed = tx.execute(
            "UPDATE projects SET description = ?, updated_at = ? WHERE id = ?",
            params![description, now(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(EstimatorError::NotFound(format!("Project {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn get_project(&self, id: &Uuid) -> Result<Option<Project>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS);
        let row = conn
            .query_row(&sql, [id.to_string()], ProjectRow::read)
            .optional()?;
        row.map(Project::try_from).transpose()
    }

    fn get_project_by_number(&self, number: &str) -> Result<Option<Project>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM projects WHERE project_number = ? COLLATE NOCASE",
            PROJECT_COLUMNS
        );
        let row = conn
            .query_row(&sql, [number.trim()], ProjectRow::read)
            .optional()?;
        row.map(Project::try_from).transpose()
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM projects ORDER BY created_at DESC, rowid DESC",
            PROJECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], ProjectRow::read)?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(Project::try_from(row?)?);
        }
        Ok(projects)
    }

    fn delete_project(&mut self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        if removed == 0 {
            return Err(EstimatorError::NotFound(format!("Project {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    // --- Estimate operations ---

    fn insert_estimate(&mut self, estimate: &NewEstimate) -> Result<Uuid> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        if !row_exists(&tx, "projects", &estimate.project_id)? {
            return Err(EstimatorError::NotFound(format!(
                "Project {} not found",
                estimate.project_id
            )));
        }

        let next_version: i32 = tx.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM estimates WHERE project_id = ?",
            [estimate.project_id.to_string()],
            |row| row.get(0),
        )?;

        let id = Uuid::new_v4();
        let timestamp = now();
        tx.execute(
            "INSERT INTO estimates (id, project_id, version, name, status, notes, total_cost, \
             markup_percentage, total_price, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, 0, 0, ?, ?, ?)",
            params![
                id.to_string(),
                estimate.project_id.to_string(),
                next_version,
                estimate.name.trim(),
                estimate.status.as_str(),
                empty_to_none(&estimate.notes),
                estimate.created_by.to_string(),
                timestamp,
                timestamp,
            ],
        )?;

        tx.commit()?;
        debug!(%id, version = next_version, "inserted estimate");
        Ok(id)
    }

    fn get_estimate(&self, id: &Uuid) -> Result<Option<Estimate>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM estimates WHERE id = ?", ESTIMATE_COLUMNS);
        let row = conn
            .query_row(&sql, [id.to_string()], EstimateRow::read)
            .optional()?;
        row.map(Estimate::try_from).transpose()
    }

    fn list_estimates(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>> {
        let conn = self.lock_conn()?;

        let mut sql = format!("SELECT {} FROM estimates WHERE 1 = 1", ESTIMATE_COLUMNS);
        let mut values: Vec<String> = Vec::new();
        if let Some(project_id) = filter.project_id {
            sql.push_str(" AND project_id = ?");
            values.push(project_id.to_string());
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            values.push(status.as_str().to_string());
        }
        sql.push_str(" ORDER BY project_id, version DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), EstimateRow::read)?;

        let mut estimates = Vec::new();
        for row in rows {
            estimates.push(Estimate::try_from(row?)?);
        }
        Ok(estimates)
    }

    fn update_estimate(&mut self, id: &Uuid, changes: &EstimateChanges) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE estimates SET name = ?, status = ?, notes = ?, updated_at = ? WHERE id = ?",
            params![
                changes.name.trim(),
                changes.status.as_str(),
                empty_to_none(&changes.notes),
                now(),
                id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(EstimatorError::NotFound(format!("Estimate {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn set_estimate_totals(&mut self, id: &Uuid, total_cost: f64, total_price: f64) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE estimates SET total_cost = ?, total_price = ?, updated_at = ? WHERE id = ?",
            params![total_cost, total_price, now(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(EstimatorError::NotFound(format!("Estimate {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_estimate(&mut self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM estimates WHERE id = ?", [id.to_string()])?;
        if removed == 0 {
            return Err(EstimatorError::NotFound(format!("Estimate {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    // --- Line item operations ---

    fn insert_line_items(&mut self, items: &[NewLineItem]) -> Result<Vec<Uuid>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let mut known_estimates = HashSet::new();
        let mut ids = Vec::with_capacity(items.len());
        let timestamp = now();

        for item in items {
            if !known_estimates.contains(&item.estimate_id) {
                if !row_exists(&tx, "estimates", &item.estimate_id)? {
                    return Err(EstimatorError::NotFound(format!(
                        "Estimate {} not found",
                        item.estimate_id
                    )));
                }
                known_estimates.insert(item.estimate_id);
            }

            let description = item.values.description.trim();
            if description.is_empty() {
                return Err(EstimatorError::Validation(
                    "Line item description is required".to_string(),
                ));
            }

            let id = Uuid::new_v4();
            let value = item.values.value;
            tx.execute(
                "INSERT INTO estimate_line_items (id, estimate_id, cost_code_id, description, \
                 quantity, unit, unit_cost, total_cost, markup_percentage, total_price, \
                 is_visible_on_proposal, proposal_description, sort_order, notes, created_at, \
                 updated_at) \
                 VALUES (?, ?, NULL, ?, 1, ?, ?, ?, 0, ?, 1, ?, ?, NULL, ?, ?)",
                params![
                    id.to_string(),
                    item.estimate_id.to_string(),
                    description,
                    LUMP_SUM_UNIT,
                    value,
                    value,
                    value,
                    empty_to_none(&item.values.proposal_description),
                    item.sort_order,
                    timestamp,
                    timestamp,
                ],
            )?;
            ids.push(id);
        }

        tx.commit()?;
        debug!(count = ids.len(), "inserted line items");
        Ok(ids)
    }

    fn get_line_item(&self, id: &Uuid) -> Result<Option<LineItem>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM estimate_line_items WHERE id = ?",
            LINE_ITEM_COLUMNS
        );
        let row = conn
            .query_row(&sql, [id.to_string()], LineItemRow::read)
            .optional()?;
        row.map(LineItem::try_from).transpose()
    }

    fn list_line_items(&self, estimate_id: &Uuid) -> Result<Vec<LineItem>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM estimate_line_items WHERE estimate_id = ? \
             ORDER BY sort_order ASC, rowid ASC",
            LINE_ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([estimate_id.to_string()], LineItemRow::read)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(LineItem::try_from(row?)?);
        }
        Ok(items)
    }

    fn max_sort_order(&self, estimate_id: &Uuid) -> Result<Option<i64>> {
        let conn = self.lock_conn()?;
        let max: Option<i64> = conn.query_row(
            "SELECT MAX(sort_order) FROM estimate_line_items WHERE estimate_id = ?",
            [estimate_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn update_line_item(&mut self, id: &Uuid, values: &LineItemValues) -> Result<()> {
        let description = values.description.trim();
        if description.is_empty() {
            return Err(EstimatorError::Validation(
                "Line item description is required".to_string(),
            ));
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE estimate_line_items SET description = ?, proposal_description = ?, \
             quantity = 1, unit = ?, unit_cost = ?, total_cost = ?, markup_percentage = 0, \
             total_price = ?, is_visible_on_proposal = 1, updated_at = ? WHERE id = ?",
            params![
                description,
                empty_to_none(&values.proposal_description),
                LUMP_SUM_UNIT,
                values.value,
                values.value,
                values.value,
                now(),
                id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(EstimatorError::NotFound(format!("Line item {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn set_sort_order(&mut self, id: &Uuid, sort_order: i64) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE estimate_line_items SET sort_order = ?, updated_at = ? WHERE id = ?",
            params![sort_order, now(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(EstimatorError::NotFound(format!("Line item {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_line_item(&mut self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM estimate_line_items WHERE id = ?",
            [id.to_string()],
        )?;
        if removed == 0 {
            return Err(EstimatorError::NotFound(format!("Line item {} not found", id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_line_items_for_estimate(&mut self, estimate_id: &Uuid) -> Result<usize> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM estimate_line_items WHERE estimate_id = ?",
            [estimate_id.to_string()],
        )?;

        tx.commit()?;
        Ok(removed)
    }

    // --- Estimate file operations ---

    fn insert_estimate_file(&mut self, file: &NewEstimateFile) -> Result<Uuid> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        if !row_exists(&tx, "estimates", &file.estimate_id)? {
            return Err(EstimatorError::NotFound(format!(
                "Estimate {} not found",
                file.estimate_id
            )));
        }

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO estimate_files (id, estimate_id, storage_path, file_name, file_size, \
             mime_type, uploaded_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id.to_string(),
                file.estimate_id.to_string(),
                file.storage_path.trim(),
                file.file_name.trim(),
                file.file_size,
                file.mime_type.trim(),
                file.uploaded_by.to_string(),
                now(),
            ],
        )?;

        tx.commit()?;
        debug!(%id, estimate_id = %file.estimate_id, "inserted estimate file");
        Ok(id)
    }

    fn get_estimate_file(&self, id: &Uuid) -> Result<Option<EstimateFile>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM estimate_files WHERE id = ?",
            ESTIMATE_FILE_COLUMNS
        );
        let row = conn
            .query_row(&sql, [id.to_string()], EstimateFileRow::read)
            .optional()?;
        row.map(EstimateFile::try_from).transpose()
    }

    fn list_estimate_files(&self, estimate_id: &Uuid) -> Result<Vec<EstimateFile>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM estimate_files WHERE estimate_id = ? \
             ORDER BY created_at ASC, rowid ASC",
            ESTIMATE_FILE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([estimate_id.to_string()], EstimateFileRow::read)?;

        let mut files = Vec::new();
        for row in rows {
            files.push(EstimateFile::try_from(row?)?);
        }
        Ok(files)
    }

    fn delete_estimate_file(&mut self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM estimate_files WHERE id = ?", [id.to_string()])?;
        if removed == 0 {
            return Err(EstimatorError::NotFound(format!(
                "Estimate file {} not found",
                id
            )));
        }

        tx.commit()?;
        Ok(())
    }

    // --- Summary operations ---

    fn dashboard_counts(&self) -> Result<DashboardCounts> {
        let conn = self.lock_conn()?;

        let active: Vec<&str> = ProjectStatus::ALL
            .iter()
            .filter(|status| status.is_active())
            .map(|status| status.as_str())
            .collect();
        let sql = format!(
            "SELECT COUNT(*) FROM projects WHERE status IN ({})",
            placeholders(active.len())
        );
        let active_projects: i64 =
            conn.query_row(&sql, params_from_iter(active.iter()), |row| row.get(0))?;

        let open: Vec<&str> = EstimateStatus::ALL
            .iter()
            .filter(|status| status.is_open())
            .map(|status| status.as_str())
            .collect();
        let sql = format!(
            "SELECT COUNT(*), COALESCE(SUM(total_price), 0.0) FROM estimates WHERE status IN ({})",
            placeholders(open.len())
        );
        let (open_estimates, open_estimate_value): (i64, f64) =
            conn.query_row(&sql, params_from_iter(open.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;

        let customers: i64 =
            conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;

        Ok(DashboardCounts {
            active_projects: active_projects as usize,
            open_estimates: open_estimates as usize,
            open_estimate_value,
            customers: customers as usize,
        })
    }

    // --- Maintenance operations ---

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if result != "ok" {
            return Err(EstimatorError::Persistence(format!(
                "Integrity check failed: {}",
                result
            )));
        }

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            let table: String = row.get(0)?;
            return Err(EstimatorError::Persistence(format!(
                "Foreign key violation in table {}",
                table
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::ProjectType;

    fn storage_with_project() -> (SqliteStorage, Uuid, Uuid) {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let actor = Uuid::new_v4();
        let fields = ProjectFields {
            name: "Smith Kitchen".to_string(),
            project_type: ProjectType::Kitchen,
            ..Default::default()
        };
        let project_id = storage.insert_project(&fields, &actor).unwrap();
        (storage, project_id, actor)
    }

    fn new_estimate(project_id: Uuid, actor: Uuid, name: &str) -> NewEstimate {
        NewEstimate {
            project_id,
            name: name.to_string(),
            status: EstimateStatus::Draft,
            notes: None,
            created_by: actor,
        }
    }

    #[test]
    fn test_project_numbers_are_sequential() {
        let (mut storage, first, actor) = storage_with_project();
        let second = storage
            .insert_project(
                &ProjectFields {
                    name: "Jones Bath".to_string(),
                    ..Default::default()
                },
                &actor,
            )
            .unwrap();

        let first = storage.get_project(&first).unwrap().unwrap();
        let second = storage.get_project(&second).unwrap().unwrap();
        assert_eq!(first.project_number, "P-0001");
        assert_eq!(second.project_number, "P-0002");
        assert!(storage
            .get_project_by_number("p-0002")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_estimate_versions_increment_per_project() {
        let (mut storage, project_id, actor) = storage_with_project();
        let other_project = storage
            .insert_project(
                &ProjectFields {
                    name: "Other".to_string(),
                    ..Default::default()
                },
                &actor,
            )
            .unwrap();

        for _ in 0..3 {
            storage
                .insert_estimate(&new_estimate(project_id, actor, "Estimate"))
                .unwrap();
        }
        let fourth = storage
            .insert_estimate(&new_estimate(project_id, actor, "Estimate"))
            .unwrap();
        let other = storage
            .insert_estimate(&new_estimate(other_project, actor, "Estimate"))
            .unwrap();

        assert_eq!(storage.get_estimate(&fourth).unwrap().unwrap().version, 4);
        assert_eq!(storage.get_estimate(&other).unwrap().unwrap().version, 1);
    }

    #[test]
    fn test_insert_estimate_unknown_project_not_found() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let result = storage.insert_estimate(&new_estimate(Uuid::new_v4(), Uuid::new_v4(), "X"));
        assert!(matches!(result, Err(EstimatorError::NotFound(_))));
    }

    #[test]
    fn test_line_items_order_ties_by_insertion() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();

        let items: Vec<NewLineItem> = ["B", "A", "C"]
            .iter()
            .zip([1, 1, 0])
            .map(|(name, order)| NewLineItem {
                estimate_id,
                values: LineItemValues::new(*name, 10.0),
                sort_order: order,
            })
            .collect();
        storage.insert_line_items(&items).unwrap();

        let names: Vec<String> = storage
            .list_line_items(&estimate_id)
            .unwrap()
            .into_iter()
            .map(|item| item.description)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
        assert_eq!(storage.max_sort_order(&estimate_id).unwrap(), Some(1));
    }

    #[test]
    fn test_line_item_is_lump_sum() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();
        let ids = storage
            .insert_line_items(&[NewLineItem {
                estimate_id,
                values: LineItemValues::new("Framing", 4200.0).with_proposal("• Walls"),
                sort_order: 0,
            }])
            .unwrap();

        let item = storage.get_line_item(&ids[0]).unwrap().unwrap();
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit, "LS");
        assert_eq!(item.unit_cost, 4200.0);
        assert_eq!(item.total_cost, 4200.0);
        assert_eq!(item.total_price, 4200.0);
        assert_eq!(item.markup_percentage, 0.0);
        assert!(item.is_visible_on_proposal);
        assert_eq!(item.proposal_description.as_deref(), Some("• Walls"));
    }

    #[test]
    fn test_blank_description_rejected() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();
        let result = storage.insert_line_items(&[NewLineItem {
            estimate_id,
            values: LineItemValues::new("  ", 1.0),
            sort_order: 0,
        }]);
        assert!(matches!(result, Err(EstimatorError::Validation(_))));
        assert!(storage.list_line_items(&estimate_id).unwrap().is_empty());
    }

    #[test]
    fn test_batch_insert_is_atomic() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();
        let result = storage.insert_line_items(&[
            NewLineItem {
                estimate_id,
                values: LineItemValues::new("Good", 1.0),
                sort_order: 0,
            },
            NewLineItem {
                estimate_id,
                values: LineItemValues::new("", 1.0),
                sort_order: 1,
            },
        ]);
        assert!(result.is_err());
        assert!(storage.list_line_items(&estimate_id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_estimate_cascades_to_items() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();
        storage
            .insert_line_items(&[NewLineItem {
                estimate_id,
                values: LineItemValues::new("Demo", 1.0),
                sort_order: 0,
            }])
            .unwrap();

        storage.delete_estimate(&estimate_id).unwrap();
        assert!(storage.list_line_items(&estimate_id).unwrap().is_empty());
        storage.check_integrity().unwrap();
    }

    #[test]
    fn test_delete_project_cascades_to_estimates() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();

        storage.delete_project(&project_id).unwrap();
        assert!(storage.get_estimate(&estimate_id).unwrap().is_none());
    }

    fn new_file(estimate_id: Uuid, actor: Uuid, name: &str) -> NewEstimateFile {
        NewEstimateFile {
            estimate_id,
            storage_path: format!("proj/{}/{}", estimate_id, name),
            file_name: name.to_string(),
            file_size: 2048,
            mime_type: "image/jpeg".to_string(),
            uploaded_by: actor,
        }
    }

    #[test]
    fn test_estimate_files_list_in_upload_order() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();
        let first = storage
            .insert_estimate_file(&new_file(estimate_id, actor, "front.jpg"))
            .unwrap();
        storage
            .insert_estimate_file(&new_file(estimate_id, actor, "plan.pdf"))
            .unwrap();

        let files = storage.list_estimate_files(&estimate_id).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["front.jpg", "plan.pdf"]);

        let stored = storage.get_estimate_file(&first).unwrap().unwrap();
        assert_eq!(stored.file_size, 2048);
        assert_eq!(stored.uploaded_by, actor);
    }

    #[test]
    fn test_estimate_file_unknown_estimate_not_found() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let result =
            storage.insert_estimate_file(&new_file(Uuid::new_v4(), Uuid::new_v4(), "a.jpg"));
        assert!(matches!(result, Err(EstimatorError::NotFound(_))));
    }

    #[test]
    fn test_delete_estimate_cascades_to_files() {
        let (mut storage, project_id, actor) = storage_with_project();
        let estimate_id = storage
            .insert_estimate(&new_estimate(project_id, actor, "Base"))
            .unwrap();
        let file_id = storage
            .insert_estimate_file(&new_file(estimate_id, actor, "front.jpg"))
            .unwrap();

        storage.delete_estimate(&estimate_id).unwrap();
        assert!(storage.get_estimate_file(&file_id).unwrap().is_none());
        assert!(matches!(
            storage.delete_estimate_file(&file_id),
            Err(EstimatorError::NotFound(_))
        ));
        storage.check_integrity().unwrap();
    }

    #[test]
    fn test_dashboard_counts_skip_closed_rows() {
        let (mut storage, project_id, actor) = storage_with_project();
        storage
            .insert_project(
                &ProjectFields {
                    name: "Finished Deck".to_string(),
                    status: ProjectStatus::Completed,
                    ..Default::default()
                },
                &actor,
            )
            .unwrap();
        let draft = storage
            .insert_estimate(&new_estimate(project_id, actor, "Draft"))
            .unwrap();
        storage.set_estimate_totals(&draft, 1500.0, 1500.0).unwrap();
        let approved = storage
            .insert_estimate(&new_estimate(project_id, actor, "Signed"))
            .unwrap();
        storage.set_estimate_totals(&approved, 9000.0, 9000.0).unwrap();
        storage
            .update_estimate(
                &approved,
                &EstimateChanges {
                    name: "Signed".to_string(),
                    status: EstimateStatus::Approved,
                    notes: None,
                },
            )
            .unwrap();

        let counts = storage.dashboard_counts().unwrap();
        assert_eq!(counts.active_projects, 1);
        assert_eq!(counts.open_estimates, 1);
        assert_eq!(counts.open_estimate_value, 1500.0);
        assert_eq!(counts.customers, 0);
    }

    #[test]
    fn test_update_missing_rows_not_found() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let missing = Uuid::new_v4();
        assert!(matches!(
            storage.set_sort_order(&missing, 3),
            Err(EstimatorError::NotFound(_))
        ));
        assert!(matches!(
            storage.set_estimate_totals(&missing, 1.0, 1.0),
            Err(EstimatorError::NotFound(_))
        ));
        assert!(matches!(
            storage.delete_line_item(&missing),
            Err(EstimatorError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_estimates_filters_by_status() {
        let (mut storage, project_id, actor) = storage_with_project();
        let draft = storage
            .insert_estimate(&new_estimate(project_id, actor, "Draft"))
            .unwrap();
        let approved = storage
            .insert_estimate(&new_estimate(project_id, actor, "Final"))
            .unwrap();
        storage
            .update_estimate(
                &approved,
                &EstimateChanges {
                    name: "Final".to_string(),
                    status: EstimateStatus::Approved,
                    notes: Some(String::new()),
                },
            )
            .unwrap();

        let all = storage
            .list_estimates(&EstimateFilter::new().project(project_id))
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, approved);
        assert!(all[0].notes.is_none());

        let drafts = storage
            .list_estimates(&EstimateFilter::new().status(EstimateStatus::Draft))
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, draft);
    }
}
