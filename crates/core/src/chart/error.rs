//! Chart of accounts error types.

use meridian_shared::ErrorClass;
use meridian_shared::types::{AccountGroupId, AccountId, SubGroupId};
use thiserror::Error;

/// Errors that can occur during chart-of-accounts operations.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account group not found.
    #[error("Account group not found: {0}")]
    GroupNotFound(AccountGroupId),

    /// Account sub-group not found.
    #[error("Account sub-group not found: {0}")]
    SubGroupNotFound(SubGroupId),

    /// Account code already in use.
    #[error("Account code already exists: {0}")]
    DuplicateCode(String),

    /// Code must be a non-empty string.
    #[error("Code is required and must be a non-empty string")]
    EmptyCode,

    /// Sub-group parent chain loops back on itself.
    #[error("Sub-group hierarchy contains a cycle at {0}")]
    CycleDetected(SubGroupId),

    /// Parent chain exceeded the configured depth guard.
    #[error("Sub-group hierarchy exceeds maximum depth of {max_depth}")]
    HierarchyTooDeep {
        /// The configured depth limit.
        max_depth: usize,
    },

    /// Account is halted after an integrity check failure.
    #[error("Account {0} is frozen pending integrity resolution")]
    AccountFrozen(AccountId),
}

impl ChartError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::SubGroupNotFound(_) => "SUB_GROUP_NOT_FOUND",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::EmptyCode => "EMPTY_CODE",
            Self::CycleDetected(_) => "HIERARCHY_CYCLE",
            Self::HierarchyTooDeep { .. } => "HIERARCHY_TOO_DEEP",
            Self::AccountFrozen(_) => "ACCOUNT_FROZEN",
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::AccountNotFound(_) | Self::GroupNotFound(_) | Self::SubGroupNotFound(_) => {
                ErrorClass::Reference
            }
            Self::DuplicateCode(_) => ErrorClass::State,
            Self::EmptyCode | Self::CycleDetected(_) | Self::HierarchyTooDeep { .. } => {
                ErrorClass::Validation
            }
            Self::AccountFrozen(_) => ErrorClass::Integrity,
        }
    }
}
