use tracing::info;
use uuid::Uuid;

use super::{required, EstimateService};
use crate::auth::Session;
use crate::error::{EstimatorError, Result};
use crate::invalidation::Invalidation;
use crate::storage::{Project, ProjectFields, StorageEngine};

fn validated(fields: &ProjectFields) -> Result<ProjectFields> {
    Ok(ProjectFields {
        name: required(&fields.name, "Project name")?,
        ..fields.clone()
    })
}

impl<S: StorageEngine> EstimateService<S> {
    pub fn create_project(&mut self, session: &Session, fields: &ProjectFields) -> Result<Uuid> {
        let actor = session.require_actor()?;
        let fields = validated(fields)?;

        let id = self.storage.insert_project(&fields, &actor.id)?;

        info!(%id, "created project");
        self.emit(&[Invalidation::ProjectList, Invalidation::Dashboard]);
        Ok(id)
    }

    pub fn update_project(
        &mut self,
        session: &Session,
        id: &Uuid,
        fields: &ProjectFields,
    ) -> Result<()> {
        session.require_actor()?;
        let fields = validated(fields)?;

        self.storage.update_project(id, &fields)?;

        info!(%id, "updated project");
        self.emit(&[
            Invalidation::ProjectList,
            Invalidation::ProjectDetail { project_id: *id },
            Invalidation::Dashboard,
        ]);
        Ok(())
    }

    /// Replace only the project description. Blank text clears it.
    pub fn update_project_description(
        &mut self,
        session: &Session,
        id: &Uuid,
        description: &str,
    ) -> Result<()> {
        session.require_actor()?;

        self.storage
            .update_project_description(id, Some(description.trim()))?;

        info!(%id, "updated project description");
        self.emit(&[Invalidation::ProjectDetail { project_id: *id }]);
        Ok(())
    }

    pub fn get_project(&self, id: &Uuid) -> Result<Project> {
        self.require_project(id)
    }

    /// Resolve a project by UUID or by its number (e.g. `P-0004`).
    pub fn find_project(&self, reference: &str) -> Result<Project> {
        let reference = reference.trim();
        if let Ok(id) = Uuid::parse_str(reference) {
            return self.require_project(&id);
        }
        self.storage
            .get_project_by_number(reference)?
            .ok_or_else(|| EstimatorError::NotFound(format!("Project {} not found", reference)))
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        self.storage.list_projects()
    }

    /// Delete a project together with its estimates and line items.
    pub fn delete_project(&mut self, session: &Session, id: &Uuid) -> Result<()> {
        session.require_actor()?;

        self.storage.delete_project(id)?;

        info!(%id, "deleted project");
        self.emit(&[
            Invalidation::ProjectList,
            Invalidation::EstimateList,
            Invalidation::Dashboard,
        ]);
        Ok(())
    }
}
