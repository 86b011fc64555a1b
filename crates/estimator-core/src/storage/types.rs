//! Core data types for the storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EstimatorError;

/// Unit used for every line item: a single flat price.
pub const LUMP_SUM_UNIT: &str = "LS";

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = EstimatorError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(EstimatorError::InvalidInput(format!(
                        "Unknown {} '{}' (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// Descriptive estimate status. Any status may follow any other.
    #[derive(Default)]
    EstimateStatus {
        #[default]
        Draft => "draft",
        Review => "review",
        Approved => "approved",
        Superseded => "superseded",
    }
}

impl EstimateStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EstimateStatus::Draft => "Draft",
            EstimateStatus::Review => "In Review",
            EstimateStatus::Approved => "Approved",
            EstimateStatus::Superseded => "Superseded",
        }
    }
}

string_enum! {
    /// Sales pipeline stage of a project.
    #[derive(Default)]
    ProjectStatus {
        #[default]
        Lead => "lead",
        Estimating => "estimating",
        ProposalSent => "proposal_sent",
        Contracted => "contracted",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Lead => "Lead",
            ProjectStatus::Estimating => "Estimating",
            ProjectStatus::ProposalSent => "Proposal Sent",
            ProjectStatus::Contracted => "Contracted",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }
}

string_enum! {
    /// Kind of construction work. Doubles as the default template key.
    #[derive(Default)]
    ProjectType {
        Remodel => "remodel",
        Addition => "addition",
        Kitchen => "kitchen",
        Bathroom => "bathroom",
        NewConstruction => "new_construction",
        #[default]
        Other => "other",
    }
}

impl ProjectType {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectType::Remodel => "Remodel",
            ProjectType::Addition => "Addition",
            ProjectType::Kitchen => "Kitchen",
            ProjectType::Bathroom => "Bathroom",
            ProjectType::NewConstruction => "New Construction",
            ProjectType::Other => "Other",
        }
    }
}

/// A customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Field values for inserting or overwriting a customer.
#[derive(Debug, Clone, Default)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
}

/// A construction project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    /// Human-facing sequential number (e.g. `P-0007`)
    pub project_number: String,
    pub name: String,
    pub customer_id: Option<Uuid>,
    pub status: ProjectStatus,
    pub project_type: ProjectType,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub estimated_value: Option<f64>,
    pub contract_value: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Single-line street address, if any part of it is known.
    pub fn full_address(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.address, &self.city, &self.state, &self.zip]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Field values for inserting or overwriting a project.
#[derive(Debug, Clone, Default)]
pub struct ProjectFields {
    pub name: String,
    pub customer_id: Option<Uuid>,
    pub status: ProjectStatus,
    pub project_type: ProjectType,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub estimated_value: Option<f64>,
    pub contract_value: Option<f64>,
    pub notes: Option<String>,
}

/// A versioned estimate for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Sequential per project, starting at 1
    pub version: i32,
    pub name: String,
    pub status: EstimateStatus,
    pub notes: Option<String>,
    /// Derived: sum of line item totals
    pub total_cost: f64,
    /// Stored but never applied
    pub markup_percentage: f64,
    /// Derived: equal to `total_cost`
    pub total_price: f64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row values for inserting an estimate. The version is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewEstimate {
    pub project_id: Uuid,
    pub name: String,
    pub status: EstimateStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

/// Editable estimate fields.
#[derive(Debug, Clone)]
pub struct EstimateChanges {
    pub name: String,
    pub status: EstimateStatus,
    pub notes: Option<String>,
}

/// Filter for listing estimates.
#[derive(Debug, Clone, Default)]
pub struct EstimateFilter {
    pub project_id: Option<Uuid>,
    pub status: Option<EstimateStatus>,
}

impl EstimateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn status(mut self, status: EstimateStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A priced row within an estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub estimate_id: Uuid,
    pub cost_code_id: Option<Uuid>,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub markup_percentage: f64,
    pub total_price: f64,
    pub is_visible_on_proposal: bool,
    pub proposal_description: Option<String>,
    pub sort_order: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lump-sum values written for a line item on insert or overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemValues {
    pub description: String,
    pub proposal_description: Option<String>,
    pub value: f64,
}

impl LineItemValues {
    pub fn new(description: impl Into<String>, value: f64) -> Self {
        Self {
            description: description.into(),
            proposal_description: None,
            value,
        }
    }

    pub fn with_proposal(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.proposal_description = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }
}

/// Row values for inserting a line item.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub estimate_id: Uuid,
    pub values: LineItemValues,
    pub sort_order: i64,
}

/// New position for a single line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortUpdate {
    pub id: Uuid,
    pub sort_order: i64,
}

/// Metadata for a photo or drawing attached to an estimate. The file body
/// lives in external storage under `storage_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateFile {
    pub id: Uuid,
    pub estimate_id: Uuid,
    pub storage_path: String,
    pub file_name: String,
    /// Size in bytes
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row values for recording an attachment.
#[derive(Debug, Clone)]
pub struct NewEstimateFile {
    pub estimate_id: Uuid,
    pub storage_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_by: Uuid,
}

/// Headline counts for the dashboard view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardCounts {
    /// Projects from lead through in progress
    pub active_projects: usize,
    /// Estimates in draft or review
    pub open_estimates: usize,
    /// Sum of `total_price` over the open estimates
    pub open_estimate_value: f64,
    pub customers: usize,
}

impl ProjectStatus {
    /// Whether the project is still in the pipeline or under way.
    pub fn is_active(&self) -> bool {
        !matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }
}

impl EstimateStatus {
    /// Whether the estimate is still being worked on.
    pub fn is_open(&self) -> bool {
        matches!(self, EstimateStatus::Draft | EstimateStatus::Review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in EstimateStatus::ALL {
            let parsed: EstimateStatus = status.as_str().parse().unwrap();
            assert_eq!(&parsed, status);
        }
    }

    #[test]
    fn test_unknown_status_is_invalid_input() {
        let err = "pending".parse::<EstimateStatus>().unwrap_err();
        assert!(matches!(err, EstimatorError::InvalidInput(_)));
        assert!(err.to_string().contains("draft, review, approved, superseded"));
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(EstimateStatus::default(), EstimateStatus::Draft);
        assert_eq!(ProjectStatus::default(), ProjectStatus::Lead);
        assert_eq!(ProjectType::default(), ProjectType::Other);
    }

    #[test]
    fn test_active_and_open_statuses() {
        let active: Vec<_> = ProjectStatus::ALL.iter().filter(|s| s.is_active()).collect();
        assert_eq!(active.len(), 5);
        assert!(!ProjectStatus::Cancelled.is_active());
        assert!(EstimateStatus::Review.is_open());
        assert!(!EstimateStatus::Approved.is_open());
        assert!(!EstimateStatus::Superseded.is_open());
    }

    #[test]
    fn test_project_type_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectType::NewConstruction).unwrap();
        assert_eq!(json, "\"new_construction\"");
    }

    #[test]
    fn test_line_item_values_blank_proposal_is_none() {
        let values = LineItemValues::new("Framing", 100.0).with_proposal("   ");
        assert!(values.proposal_description.is_none());
    }

    #[test]
    fn test_estimate_filter_builder() {
        let project_id = Uuid::new_v4();
        let filter = EstimateFilter::new()
            .project(project_id)
            .status(EstimateStatus::Review);
        assert_eq!(filter.project_id, Some(project_id));
        assert_eq!(filter.status, Some(EstimateStatus::Review));
    }
}
