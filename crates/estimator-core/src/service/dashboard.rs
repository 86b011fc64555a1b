use super::EstimateService;
use crate::error::Result;
use crate::storage::{DashboardCounts, StorageEngine};

impl<S: StorageEngine> EstimateService<S> {
    /// Headline counts: active projects, open estimates and their value,
    /// and customers.
    pub fn dashboard(&self) -> Result<DashboardCounts> {
        self.storage.dashboard_counts()
    }
}
