//! Explicit actor attribution.
//!
//! Every mutating ledger operation takes an [`Actor`] so audit records can
//! name who performed the change. There is no ambient "current user".

use serde::{Deserialize, Serialize};

use super::id::ActorId;

/// The user or system agent performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier of the actor.
    pub id: ActorId,
    /// Display name recorded in audit output.
    pub name: String,
}

impl Actor {
    /// Creates an actor with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
        }
    }

    /// The scheduler's own identity, used for postings it initiates.
    #[must_use]
    pub fn scheduler() -> Self {
        Self::new("recurring-scheduler")
    }
}
