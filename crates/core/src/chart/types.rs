//! Chart of accounts domain types.

use meridian_shared::types::{AccountGroupId, AccountId, SubGroupId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Resources owned (cash, receivables, inventory).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountKind {
    /// Returns the balance-normal side for this kind of account.
    ///
    /// Assets and expenses increase with debits; liabilities, equity, and
    /// revenue increase with credits.
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }
}

/// Classification of a top-level account group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Asset accounts.
    Assets,
    /// Liability accounts.
    Liabilities,
    /// Revenue accounts.
    Income,
    /// Expense accounts.
    Expenses,
}

/// The side on which an account's balance normally sits.
///
/// The sign convention for posting:
/// - Debit-normal: balance += debit - credit
/// - Credit-normal: balance += credit - debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Balance increases with debits (assets, expenses).
    Debit,
    /// Balance increases with credits (liabilities, equity, revenue).
    Credit,
}

impl NormalSide {
    /// Calculates the balance change a debit/credit pair applies to an
    /// account with this normal side.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Reference from a ledger account to its hierarchy parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountParent {
    /// Parent is a top-level group.
    Group(AccountGroupId),
    /// Parent is a sub-group.
    SubGroup(SubGroupId),
}

/// A top-level node in the chart of accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountGroup {
    /// Unique identifier.
    pub id: AccountGroupId,
    /// Unique group code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Group classification.
    pub kind: GroupKind,
}

/// An intermediate node between groups and ledger accounts.
///
/// Sub-groups always belong to a group and may nest under another
/// sub-group, forming a tree (never a cycle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSubGroup {
    /// Unique identifier.
    pub id: SubGroupId,
    /// Unique sub-group code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// The group this sub-group ultimately belongs to.
    pub parent_group: AccountGroupId,
    /// Optional nesting under another sub-group.
    pub parent_sub_group: Option<SubGroupId>,
}

/// A postable ledger account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Unique account code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Account classification.
    pub kind: AccountKind,
    /// The side on which this account's balance normally sits.
    pub normal_side: NormalSide,
    /// Optional hierarchy parent.
    pub parent: Option<AccountParent>,
    /// Balance carried in at account creation.
    pub opening_balance: Decimal,
    /// Incrementally maintained balance. Always recomputable as
    /// `opening_balance` plus the signed sum of all posted lines.
    pub current_balance: Decimal,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
}

impl Account {
    /// Returns the signed balance change a posted line applies to this
    /// account.
    #[must_use]
    pub fn balance_change(&self, debit: Decimal, credit: Decimal) -> Decimal {
        self.normal_side.balance_change(debit, credit)
    }
}
