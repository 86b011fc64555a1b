//! Estimate lifecycle: versioned creation, template seeding, update, delete.

use tracing::{info, warn};
use uuid::Uuid;

use super::{required, EstimateService};
use crate::auth::Session;
use crate::error::{EstimatorError, Result};
use crate::invalidation::Invalidation;
use crate::storage::{
    Estimate, EstimateChanges, EstimateFilter, EstimateStatus, LineItem, LineItemValues,
    NewEstimate, NewLineItem, StorageEngine,
};
use crate::templates;

/// User-supplied estimate fields.
#[derive(Debug, Clone, Default)]
pub struct EstimateInput {
    pub name: String,
    /// Defaults to `draft` when absent
    pub status: Option<EstimateStatus>,
    pub notes: Option<String>,
}

impl EstimateInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn status(mut self, status: EstimateStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl<S: StorageEngine> EstimateService<S> {
    /// Create the next version of an estimate for a project, with zero totals.
    pub fn create_estimate(
        &mut self,
        session: &Session,
        project_id: &Uuid,
        input: &EstimateInput,
    ) -> Result<Uuid> {
        let actor = session.require_actor()?;
        let name = required(&input.name, "Estimate name")?;

        let id = self.storage.insert_estimate(&NewEstimate {
            project_id: *project_id,
            name,
            status: input.status.unwrap_or_default(),
            notes: input.notes.clone(),
            created_by: actor.id,
        })?;

        info!(%id, %project_id, "created estimate");
        self.emit(&Invalidation::for_estimate(*project_id, None));
        Ok(id)
    }

    /// Create an estimate and seed it with the template's items.
    ///
    /// Unknown or empty templates leave the estimate empty. If seeding fails
    /// the estimate is kept and the error names its id.
    pub fn create_estimate_from_template(
        &mut self,
        session: &Session,
        project_id: &Uuid,
        input: &EstimateInput,
        template_key: &str,
    ) -> Result<Uuid> {
        let id = self.create_estimate(session, project_id, input)?;

        let names = templates::template_items(template_key);
        if names.is_empty() {
            return Ok(id);
        }

        let rows: Vec<NewLineItem> = names
            .iter()
            .enumerate()
            .map(|(index, name)| NewLineItem {
                estimate_id: id,
                values: LineItemValues::new(*name, 0.0),
                sort_order: index as i64,
            })
            .collect();

        if let Err(err) = self.storage.insert_line_items(&rows) {
            warn!(%id, template = template_key, error = %err, "template seeding failed; estimate kept");
            self.emit(&Invalidation::for_estimate(*project_id, Some(id)));
            return Err(EstimatorError::Persistence(format!(
                "Estimate {} was created but seeding template '{}' failed: {}",
                id, template_key, err
            )));
        }

        info!(%id, template = template_key, items = rows.len(), "seeded estimate from template");
        self.emit(&Invalidation::for_estimate(*project_id, Some(id)));
        Ok(id)
    }

    /// Overwrite an estimate's name, status and notes.
    pub fn update_estimate(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        input: &EstimateInput,
    ) -> Result<()> {
        session.require_actor()?;
        let name = required(&input.name, "Estimate name")?;
        let estimate = self.require_estimate(estimate_id)?;

        self.storage.update_estimate(
            estimate_id,
            &EstimateChanges {
                name,
                status: input.status.unwrap_or_default(),
                notes: input.notes.clone(),
            },
        )?;

        info!(%estimate_id, "updated estimate");
        self.emit(&Invalidation::for_estimate(
            estimate.project_id,
            Some(*estimate_id),
        ));
        Ok(())
    }

    /// Delete an estimate: its line items first, then the estimate itself.
    pub fn delete_estimate(&mut self, session: &Session, estimate_id: &Uuid) -> Result<()> {
        session.require_actor()?;
        let estimate = self.require_estimate(estimate_id)?;

        let removed = self.storage.delete_line_items_for_estimate(estimate_id)?;
        self.storage.delete_estimate(estimate_id)?;

        info!(%estimate_id, line_items = removed, "deleted estimate");
        self.emit(&Invalidation::for_estimate(estimate.project_id, None));
        Ok(())
    }

    pub fn get_estimate(&self, estimate_id: &Uuid) -> Result<Estimate> {
        self.require_estimate(estimate_id)
    }

    pub fn list_estimates(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>> {
        self.storage.list_estimates(filter)
    }

    /// An estimate's line items in display order.
    pub fn list_line_items(&self, estimate_id: &Uuid) -> Result<Vec<LineItem>> {
        self.require_estimate(estimate_id)?;
        self.storage.list_line_items(estimate_id)
    }

    pub fn get_line_item(&self, estimate_id: &Uuid, line_item_id: &Uuid) -> Result<LineItem> {
        self.require_line_item(estimate_id, line_item_id)
    }
}
