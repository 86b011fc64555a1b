//! Session and actor resolution.
//!
//! Sign-in happens outside this crate. Callers build a [`Session`] from
//! whatever identity they resolved; mutating operations require one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EstimatorError, Result};

/// The authenticated user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
}

impl Actor {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Request-scoped authentication state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    actor: Option<Actor>,
}

impl Session {
    /// A session with a signed-in actor.
    pub fn authenticated(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        Self { actor: None }
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Resolve the current actor, failing with [`EstimatorError::Auth`] if absent.
    pub fn require_actor(&self) -> Result<&Actor> {
        self.actor.as_ref().ok_or(EstimatorError::Auth)
    }
}
