//! Engine error types.
//!
//! Posting errors are returned to the caller; integrity errors are system
//! alerts that additionally freeze the affected account.

use chrono::NaiveDate;
use meridian_core::journal::ValidationReport;
use meridian_shared::ErrorClass;
use meridian_shared::types::{AccountId, JournalEntryId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while posting or reversing a journal entry.
#[derive(Debug, Error)]
pub enum PostingError {
    /// The draft failed double-entry validation.
    #[error("Journal entry failed validation ({} issue(s))", .0.errors.len())]
    Rejected(ValidationReport),

    /// A line's account id is not a well-formed identifier.
    #[error("Malformed account id: {0}")]
    MalformedAccountId(String),

    /// A line's account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// The account is halted after an integrity check failure.
    #[error("Account {0} is frozen pending integrity resolution")]
    AccountFrozen(AccountId),

    /// The entry to reverse does not exist.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// The entry to reverse has never been posted.
    #[error("Journal entry {0} is not posted")]
    EntryNotPosted(JournalEntryId),

    /// The entry has already been reversed.
    #[error("Journal entry {0} has already been reversed")]
    AlreadyReversed(JournalEntryId),

    /// A stored entry's own lines do not balance; history is corrupted.
    #[error("Stored journal entry {0} is unbalanced and cannot be reversed")]
    CorruptStoredEntry(JournalEntryId),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "VALIDATION_FAILED",
            Self::MalformedAccountId(_) => "MALFORMED_ACCOUNT_ID",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountFrozen(_) => "ACCOUNT_FROZEN",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::EntryNotPosted(_) => "ENTRY_NOT_POSTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::CorruptStoredEntry(_) => "CORRUPT_STORED_ENTRY",
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Rejected(_) | Self::MalformedAccountId(_) => ErrorClass::Validation,
            Self::AccountNotFound(_) | Self::EntryNotFound(_) | Self::EntryNotPosted(_) => {
                ErrorClass::Reference
            }
            Self::AlreadyReversed(_) => ErrorClass::State,
            Self::AccountFrozen(_) | Self::CorruptStoredEntry(_) => ErrorClass::Integrity,
        }
    }
}

/// Inconsistencies detected inside the ledger itself.
///
/// These indicate an engine defect rather than bad input; they are logged
/// as system alerts and halt posting on the affected account.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The incrementally maintained balance diverged from recomputation.
    #[error(
        "Account {account_id} balance drift: incremental {incremental}, recomputed {recomputed}"
    )]
    BalanceDrift {
        /// The affected account.
        account_id: AccountId,
        /// The incrementally maintained balance.
        incremental: Decimal,
        /// The balance recomputed from posted lines.
        recomputed: Decimal,
    },

    /// Grand total debits and credits disagree across posted entries.
    #[error("Trial balance broken as of {as_of}: debits {debits}, credits {credits}")]
    TrialBalanceBroken {
        /// The report cutoff date.
        as_of: NaiveDate,
        /// Grand total debits.
        debits: Decimal,
        /// Grand total credits.
        credits: Decimal,
    },
}

impl IntegrityError {
    /// Returns the error code for operator alerts.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BalanceDrift { .. } => "BALANCE_DRIFT",
            Self::TrialBalanceBroken { .. } => "TRIAL_BALANCE_BROKEN",
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Integrity
    }
}
