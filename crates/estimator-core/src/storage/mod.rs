//! Storage abstractions and the SQLite backend.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStorage;
pub use traits::StorageEngine;
pub use types::{
    Customer, CustomerFields, DashboardCounts, Estimate, EstimateChanges, EstimateFile,
    EstimateFilter, EstimateStatus, LineItem, LineItemValues, NewEstimate, NewEstimateFile,
    NewLineItem, Project, ProjectFields, ProjectStatus, ProjectType, SortUpdate, LUMP_SUM_UNIT,
};
