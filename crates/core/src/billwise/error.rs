//! Bill tracking error types.

use meridian_shared::ErrorClass;
use meridian_shared::types::{AccountId, BillId, JournalEntryId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during bill tracking operations.
#[derive(Debug, Error)]
pub enum BillError {
    /// Bill not found.
    #[error("Bill not found: {0}")]
    BillNotFound(BillId),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// A bill with this reference already exists on the account.
    #[error("Bill reference already exists for this account: {reference}")]
    DuplicateReference {
        /// The conflicting bill reference.
        reference: String,
    },

    /// Bill amount must be positive.
    #[error("Bill amount must be positive")]
    NonPositiveAmount,

    /// Payment would push the bill balance below zero.
    #[error("Payment of {amount} exceeds outstanding balance of {balance}")]
    Overpayment {
        /// The attempted payment amount.
        amount: Decimal,
        /// The outstanding balance at the time of the attempt.
        balance: Decimal,
    },

    /// The journal entry backing a payment does not exist.
    #[error("Payment journal entry not found: {0}")]
    PaymentEntryNotFound(JournalEntryId),

    /// The journal entry backing a payment has not been posted.
    #[error("Payment journal entry is not posted: {0}")]
    PaymentEntryNotPosted(JournalEntryId),
}

impl BillError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BillNotFound(_) => "BILL_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateReference { .. } => "DUPLICATE_REFERENCE",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::PaymentEntryNotFound(_) => "PAYMENT_ENTRY_NOT_FOUND",
            Self::PaymentEntryNotPosted(_) => "PAYMENT_ENTRY_NOT_POSTED",
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::BillNotFound(_) | Self::AccountNotFound(_) | Self::PaymentEntryNotFound(_) => {
                ErrorClass::Reference
            }
            Self::DuplicateReference { .. }
            | Self::Overpayment { .. }
            | Self::PaymentEntryNotPosted(_) => ErrorClass::State,
            Self::NonPositiveAmount => ErrorClass::Validation,
        }
    }
}
