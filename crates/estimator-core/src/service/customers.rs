use tracing::info;
use uuid::Uuid;

use super::{required, EstimateService};
use crate::auth::Session;
use crate::error::{EstimatorError, Result};
use crate::invalidation::Invalidation;
use crate::storage::{Customer, CustomerFields, StorageEngine};

fn validated(fields: &CustomerFields) -> Result<CustomerFields> {
    Ok(CustomerFields {
        first_name: required(&fields.first_name, "First name")?,
        last_name: required(&fields.last_name, "Last name")?,
        ..fields.clone()
    })
}

impl<S: StorageEngine> EstimateService<S> {
    pub fn create_customer(&mut self, session: &Session, fields: &CustomerFields) -> Result<Uuid> {
        let actor = session.require_actor()?;
        let fields = validated(fields)?;

        let id = self.storage.insert_customer(&fields, &actor.id)?;

        info!(%id, "created customer");
        self.emit(&[Invalidation::CustomerList, Invalidation::Dashboard]);
        Ok(id)
    }

    pub fn update_customer(
        &mut self,
        session: &Session,
        id: &Uuid,
        fields: &CustomerFields,
    ) -> Result<()> {
        session.require_actor()?;
        let fields = validated(fields)?;

        self.storage.update_customer(id, &fields)?;

        info!(%id, "updated customer");
        self.emit(&[Invalidation::CustomerList]);
        Ok(())
    }

    pub fn get_customer(&self, id: &Uuid) -> Result<Customer> {
        self.storage
            .get_customer(id)?
            .ok_or_else(|| EstimatorError::NotFound(format!("Customer {} not found", id)))
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        self.storage.list_customers()
    }

    /// Delete a customer. Refused while any project still references it.
    pub fn delete_customer(&mut self, session: &Session, id: &Uuid) -> Result<()> {
        session.require_actor()?;

        let linked = self.storage.count_customer_projects(id)?;
        if linked > 0 {
            return Err(EstimatorError::Validation(format!(
                "Cannot delete: {} project(s) linked to this customer. Remove the project links first.",
                linked
            )));
        }

        self.storage.delete_customer(id)?;

        info!(%id, "deleted customer");
        self.emit(&[Invalidation::CustomerList, Invalidation::Dashboard]);
        Ok(())
    }
}
