//! Application-wide error taxonomy.
//!
//! Every error produced by the ledger engine belongs to exactly one class.
//! Validation and reference errors are returned to the immediate caller;
//! state errors signal a conflict with current entity state; integrity
//! errors are system alerts that halt posting on the affected account.

use serde::{Deserialize, Serialize};

/// Classification of engine errors, driving propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// User-fixable input problem (bad shape, unbalanced entry, missing
    /// field). Always returned as data, never an exception.
    Validation,
    /// An identifier did not resolve (account, bill, entry, definition).
    Reference,
    /// The operation conflicts with current entity state (already reversed,
    /// overpayment, duplicate reference).
    State,
    /// The ledger itself is inconsistent. Not user-facing; logged as a
    /// system alert and posting against the affected account is halted.
    Integrity,
    /// Unexpected internal failure.
    Internal,
}

impl ErrorClass {
    /// Returns the string representation used in logs and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Reference => "reference",
            Self::State => "state",
            Self::Integrity => "integrity",
            Self::Internal => "internal",
        }
    }

    /// Returns true if the error should be reported back to the caller
    /// as correctable input rather than escalated.
    #[must_use]
    pub const fn is_user_facing(self) -> bool {
        matches!(self, Self::Validation | Self::Reference | Self::State)
    }

    /// Returns true if the error must be surfaced to operators as a
    /// system-integrity alert.
    #[must_use]
    pub const fn is_system_alert(self) -> bool {
        matches!(self, Self::Integrity)
    }
}
