//! Generation-backed operations.

use tracing::info;
use uuid::Uuid;

use super::{BulkMode, EstimateService, LineItemInput};
use crate::auth::Session;
use crate::error::Result;
use crate::generation::{DraftGenerator, DraftRequest, ScopeRequest};
use crate::storage::StorageEngine;

impl<S: StorageEngine> EstimateService<S> {
    /// Draft line items for an estimate from a free-text project description
    /// and store them through [`bulk_create_line_items`](Self::bulk_create_line_items).
    ///
    /// Returns the number of items inserted.
    pub fn generate_draft<G: DraftGenerator + ?Sized>(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        generator: &G,
        description: &str,
        file_urls: &[String],
        mode: BulkMode,
    ) -> Result<usize> {
        session.require_actor()?;
        let estimate = self.require_estimate(estimate_id)?;
        let project = self.require_project(&estimate.project_id)?;

        let request = DraftRequest {
            project_type: project.project_type.as_str().to_string(),
            project_name: project.name.clone(),
            project_address: project.full_address(),
            project_description: description.trim().to_string(),
            file_urls: file_urls.to_vec(),
        };
        request.validate()?;

        let items = generator.draft_line_items(&request)?;
        info!(%estimate_id, generated = items.len(), "received draft line items");

        self.bulk_create_line_items(session, estimate_id, items, mode)
    }

    /// Like [`generate_draft`](Self::generate_draft), but also sends the URLs
    /// of the estimate's attached files. `file_urls` go first; attachment
    /// URLs already present are not repeated.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_draft_with_attachments<G: DraftGenerator + ?Sized>(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        generator: &G,
        description: &str,
        file_urls: &[String],
        base_url: Option<&str>,
        mode: BulkMode,
    ) -> Result<usize> {
        session.require_actor()?;
        let mut urls = file_urls.to_vec();
        for url in self.attachment_urls(estimate_id, base_url)? {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        info!(%estimate_id, files = urls.len(), "drafting with attachments");

        self.generate_draft(session, estimate_id, generator, description, &urls, mode)
    }

    /// Generate scope text for a line item and store it as its proposal
    /// description. Returns the stored text.
    pub fn generate_scope_for_line_item<G: DraftGenerator + ?Sized>(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        line_item_id: &Uuid,
        generator: &G,
        dictation: Option<&str>,
    ) -> Result<String> {
        session.require_actor()?;
        let estimate = self.require_estimate(estimate_id)?;
        let item = self.require_line_item(estimate_id, line_item_id)?;
        let project = self.require_project(&estimate.project_id)?;

        let request = ScopeRequest {
            item_name: item.description.clone(),
            dictation: dictation.map(str::to_string),
            project_type: Some(project.project_type.as_str().to_string()),
            project_name: Some(project.name.clone()),
            project_address: project.full_address(),
            project_overview: project.description.clone(),
        };
        request.validate()?;

        let scope = generator.scope_text(&request)?;

        let input = LineItemInput::new(item.description, item.total_price).proposal(scope.clone());
        self.update_line_item(session, line_item_id, estimate_id, &input)?;

        info!(%line_item_id, %estimate_id, "stored generated scope");
        Ok(scope)
    }
}
