//! Change signals for cached views.
//!
//! Every successful mutation reports which views are now stale. Callers that
//! cache rendered pages or listings plug in an [`InvalidationSink`].

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// A view whose cached contents are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Invalidation {
    ProjectList,
    ProjectDetail { project_id: Uuid },
    EstimateList,
    EstimateDetail { project_id: Uuid, estimate_id: Uuid },
    CustomerList,
    Dashboard,
}

impl Invalidation {
    /// Route-style path of the view.
    pub fn path(&self) -> String {
        match self {
            Invalidation::ProjectList => "/projects".to_string(),
            Invalidation::ProjectDetail { project_id } => format!("/projects/{}", project_id),
            Invalidation::EstimateList => "/estimates".to_string(),
            Invalidation::EstimateDetail {
                project_id,
                estimate_id,
            } => format!("/projects/{}/estimates/{}", project_id, estimate_id),
            Invalidation::CustomerList => "/customers".to_string(),
            Invalidation::Dashboard => "/dashboard".to_string(),
        }
    }

    /// Views touched by a change to an estimate or its line items.
    pub(crate) fn for_estimate(project_id: Uuid, estimate_id: Option<Uuid>) -> Vec<Invalidation> {
        let mut views = vec![
            Invalidation::ProjectDetail { project_id },
            Invalidation::EstimateList,
        ];
        if let Some(estimate_id) = estimate_id {
            views.push(Invalidation::EstimateDetail {
                project_id,
                estimate_id,
            });
        }
        views
    }
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receiver of invalidation signals.
pub trait InvalidationSink: Send {
    fn invalidate(&self, views: &[Invalidation]);
}

/// Discards every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl InvalidationSink for NoopSink {
    fn invalidate(&self, _views: &[Invalidation]) {}
}

/// Logs each signal at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl InvalidationSink for TracingSink {
    fn invalidate(&self, views: &[Invalidation]) {
        for view in views {
            debug!(path = %view, "invalidated");
        }
    }
}

/// Records signals in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    seen: Arc<Mutex<Vec<Invalidation>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in emission order.
    pub fn recorded(&self) -> Vec<Invalidation> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Invalidation> {
        match self.seen.lock() {
            Ok(mut seen) => std::mem::take(&mut *seen),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl InvalidationSink for MemorySink {
    fn invalidate(&self, views: &[Invalidation]) {
        let mut seen = match self.seen.lock() {
            Ok(seen) => seen,
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.extend_from_slice(views);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let project_id = Uuid::nil();
        let estimate_id = Uuid::nil();
        assert_eq!(Invalidation::EstimateList.path(), "/estimates");
        assert_eq!(
            Invalidation::ProjectDetail { project_id }.path(),
            format!("/projects/{}", project_id)
        );
        assert_eq!(
            Invalidation::EstimateDetail {
                project_id,
                estimate_id
            }
            .path(),
            format!("/projects/{}/estimates/{}", project_id, estimate_id)
        );
    }

    #[test]
    fn test_for_estimate_without_detail() {
        let views = Invalidation::for_estimate(Uuid::nil(), None);
        assert_eq!(views.len(), 2);
        assert!(!views
            .iter()
            .any(|v| matches!(v, Invalidation::EstimateDetail { .. })));
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        sink.invalidate(&[Invalidation::Dashboard, Invalidation::ProjectList]);
        assert_eq!(
            handle.take(),
            vec![Invalidation::Dashboard, Invalidation::ProjectList]
        );
        assert!(sink.recorded().is_empty());
    }
}
