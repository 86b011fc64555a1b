//! Row types for database queries.
//!
//! Rows are read as raw SQLite values first and parsed into domain types
//! separately, so a malformed value surfaces as a storage error instead of a
//! panic inside the query closure.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{EstimatorError, Result};
use crate::storage::types::{Customer, Estimate, EstimateFile, LineItem, Project};

pub const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, address, city, \
     state, zip, notes, created_by, created_at, updated_at";

pub const PROJECT_COLUMNS: &str = "id, project_number, name, customer_id, status, project_type, \
     description, address, city, state, zip, estimated_value, contract_value, notes, created_by, \
     created_at, updated_at";

pub const ESTIMATE_COLUMNS: &str = "id, project_id, version, name, status, notes, total_cost, \
     markup_percentage, total_price, created_by, created_at, updated_at";

pub const LINE_ITEM_COLUMNS: &str = "id, estimate_id, cost_code_id, description, quantity, unit, \
     unit_cost, total_cost, markup_percentage, total_price, is_visible_on_proposal, \
     proposal_description, sort_order, notes, created_at, updated_at";

pub const ESTIMATE_FILE_COLUMNS: &str = "id, estimate_id, storage_path, file_name, file_size, \
     mime_type, uploaded_by, created_at";

fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| EstimatorError::Persistence(format!("Invalid {} UUID: {}", field, e)))
}

fn parse_optional_uuid(value: Option<&str>, field: &str) -> Result<Option<Uuid>> {
    value.map(|v| parse_uuid(v, field)).transpose()
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| EstimatorError::Persistence(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

fn parse_enum<T: std::str::FromStr<Err = EstimatorError>>(value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|e: EstimatorError| EstimatorError::Persistence(e.to_string()))
}

/// Raw row data from the customers table.
#[derive(Debug)]
pub struct CustomerRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CustomerRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            address: row.get(5)?,
            city: row.get(6)?,
            state: row.get(7)?,
            zip: row.get(8)?,
            notes: row.get(9)?,
            created_by: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

impl TryFrom<CustomerRow> for Customer {
    type Error = EstimatorError;

    fn try_from(row: CustomerRow) -> Result<Self> {
        Ok(Customer {
            id: parse_uuid(&row.id, "customer")?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            state: row.state,
            zip: row.zip,
            notes: row.notes,
            created_by: parse_uuid(&row.created_by, "created_by")?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the projects table.
#[derive(Debug)]
pub struct ProjectRow {
    pub id: String,
    pub project_number: String,
    pub name: String,
    pub customer_id: Option<String>,
    pub status: String,
    pub project_type: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub estimated_value: Option<f64>,
    pub contract_value: Option<f64>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ProjectRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_number: row.get(1)?,
            name: row.get(2)?,
            customer_id: row.get(3)?,
            status: row.get(4)?,
            project_type: row.get(5)?,
            description: row.get(6)?,
            address: row.get(7)?,
            city: row.get(8)?,
            state: row.get(9)?,
            zip: row.get(10)?,
            estimated_value: row.get(11)?,
            contract_value: row.get(12)?,
            notes: row.get(13)?,
            created_by: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }
}

impl TryFrom<ProjectRow> for Project {
    type Error = EstimatorError;

    fn try_from(row: ProjectRow) -> Result<Self> {
        Ok(Project {
            id: parse_uuid(&row.id, "project")?,
            project_number: row.project_number,
            name: row.name,
            customer_id: parse_optional_uuid(row.customer_id.as_deref(), "customer_id")?,
            status: parse_enum(&row.status)?,
            project_type: parse_enum(&row.project_type)?,
            description: row.description,
            address: row.address,
            city: row.city,
            state: row.state,
            zip: row.zip,
            estimated_value: row.estimated_value,
            contract_value: row.contract_value,
            notes: row.notes,
            created_by: parse_uuid(&row.created_by, "created_by")?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the estimates table.
#[derive(Debug)]
pub struct EstimateRow {
    pub id: String,
    pub project_id: String,
    pub version: i32,
    pub name: String,
    pub status: String,
    pub notes: Option<String>,
    pub total_cost: f64,
    pub markup_percentage: f64,
    pub total_price: f64,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl EstimateRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            version: row.get(2)?,
            name: row.get(3)?,
            status: row.get(4)?,
            notes: row.get(5)?,
            total_cost: row.get(6)?,
            markup_percentage: row.get(7)?,
            total_price: row.get(8)?,
            created_by: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl TryFrom<EstimateRow> for Estimate {
    type Error = EstimatorError;

    fn try_from(row: EstimateRow) -> Result<Self> {
        Ok(Estimate {
            id: parse_uuid(&row.id, "estimate")?,
            project_id: parse_uuid(&row.project_id, "project_id")?,
            version: row.version,
            name: row.name,
            status: parse_enum(&row.status)?,
            notes: row.notes,
            total_cost: row.total_cost,
            markup_percentage: row.markup_percentage,
            total_price: row.total_price,
            created_by: parse_uuid(&row.created_by, "created_by")?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the estimate_line_items table.
#[derive(Debug)]
pub struct LineItemRow {
    pub id: String,
    pub estimate_id: String,
    pub cost_code_id: Option<String>,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub markup_percentage: f64,
    pub total_price: Option<f64>,
    pub is_visible_on_proposal: bool,
    pub proposal_description: Option<String>,
    pub sort_order: i64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl LineItemRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            estimate_id: row.get(1)?,
            cost_code_id: row.get(2)?,
            description: row.get(3)?,
            quantity: row.get(4)?,
            unit: row.get(5)?,
            unit_cost: row.get(6)?,
            total_cost: row.get(7)?,
            markup_percentage: row.get(8)?,
            total_price: row.get(9)?,
            is_visible_on_proposal: row.get(10)?,
            proposal_description: row.get(11)?,
            sort_order: row.get(12)?,
            notes: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = EstimatorError;

    fn try_from(row: LineItemRow) -> Result<Self> {
        Ok(LineItem {
            id: parse_uuid(&row.id, "line item")?,
            estimate_id: parse_uuid(&row.estimate_id, "estimate_id")?,
            cost_code_id: parse_optional_uuid(row.cost_code_id.as_deref(), "cost_code_id")?,
            description: row.description,
            quantity: row.quantity,
            unit: row.unit,
            unit_cost: row.unit_cost,
            total_cost: row.total_cost,
            markup_percentage: row.markup_percentage,
            total_price: row.total_price.unwrap_or(0.0),
            is_visible_on_proposal: row.is_visible_on_proposal,
            proposal_description: row.proposal_description,
            sort_order: row.sort_order,
            notes: row.notes,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the estimate_files table.
#[derive(Debug)]
pub struct EstimateFileRow {
    pub id: String,
    pub estimate_id: String,
    pub storage_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_by: String,
    pub created_at: String,
}

impl EstimateFileRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            estimate_id: row.get(1)?,
            storage_path: row.get(2)?,
            file_name: row.get(3)?,
            file_size: row.get(4)?,
            mime_type: row.get(5)?,
            uploaded_by: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<EstimateFileRow> for EstimateFile {
    type Error = EstimatorError;

    fn try_from(row: EstimateFileRow) -> Result<Self> {
        Ok(EstimateFile {
            id: parse_uuid(&row.id, "estimate file")?,
            estimate_id: parse_uuid(&row.estimate_id, "estimate_id")?,
            storage_path: row.storage_path,
            file_name: row.file_name,
            file_size: row.file_size,
            mime_type: row.mime_type,
            uploaded_by: parse_uuid(&row.uploaded_by, "uploaded_by")?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}
