//! Chart of accounts.
//!
//! This module implements the hierarchical account registry:
//! - Account groups, sub-groups, and ledger accounts
//! - The debit/credit sign convention per account
//! - Hierarchy consistency rules (parents exist, chains are acyclic)
//! - Error types for chart operations

pub mod error;
pub mod hierarchy;
pub mod types;

pub use error::ChartError;
pub use hierarchy::{account_parent_exists, validate_sub_group};
pub use types::{
    Account, AccountGroup, AccountKind, AccountParent, AccountSubGroup, GroupKind, NormalSide,
};
