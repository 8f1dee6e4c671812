//! Scheduler error types.

use meridian_shared::ErrorClass;
use meridian_shared::types::RecurringEntryId;
use thiserror::Error;

/// Errors that can occur during recurring-entry scheduling.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Definition not found.
    #[error("Recurring definition not found: {0}")]
    DefinitionNotFound(RecurringEntryId),

    /// The definition is not waiting for approval.
    #[error("Recurring definition {0} is not pending approval")]
    NotPendingApproval(RecurringEntryId),

    /// The definition is not in the failed state.
    #[error("Recurring definition {0} is not failed")]
    NotFailed(RecurringEntryId),

    /// The definition has used up its retry budget.
    #[error("Recurring definition {id} has exhausted its {max_retries} retries")]
    RetriesExhausted {
        /// The failed definition.
        id: RecurringEntryId,
        /// Its retry ceiling.
        max_retries: u32,
    },

    /// Another tick is already in progress.
    #[error("A scheduler tick is already running")]
    TickAlreadyRunning,

    /// The definition is deactivated.
    #[error("Recurring definition {0} is inactive")]
    Inactive(RecurringEntryId),

    /// Generation or posting of the materialized entry failed.
    #[error("Posting for recurring definition {id} failed: {reason}")]
    PostingFailed {
        /// The definition whose entry failed.
        id: RecurringEntryId,
        /// Why posting was rejected.
        reason: String,
    },
}

impl SchedulerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DefinitionNotFound(_) => "DEFINITION_NOT_FOUND",
            Self::NotPendingApproval(_) => "NOT_PENDING_APPROVAL",
            Self::NotFailed(_) => "NOT_FAILED",
            Self::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            Self::TickAlreadyRunning => "TICK_ALREADY_RUNNING",
            Self::Inactive(_) => "DEFINITION_INACTIVE",
            Self::PostingFailed { .. } => "POSTING_FAILED",
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::DefinitionNotFound(_) => ErrorClass::Reference,
            Self::NotPendingApproval(_)
            | Self::NotFailed(_)
            | Self::RetriesExhausted { .. }
            | Self::TickAlreadyRunning
            | Self::Inactive(_)
            | Self::PostingFailed { .. } => ErrorClass::State,
        }
    }
}
