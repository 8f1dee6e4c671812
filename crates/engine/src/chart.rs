//! Chart of accounts service.
//!
//! Registration, lookup, read-only balance recomputation, and the
//! reconciliation check that freezes an account when its incremental
//! balance has drifted from its posted history.

use std::sync::Arc;

use chrono::NaiveDate;
use meridian_core::chart::{
    Account, AccountGroup, AccountKind, AccountParent, AccountSubGroup, ChartError, GroupKind,
    NormalSide, account_parent_exists, validate_sub_group,
};
use meridian_shared::config::HierarchyConfig;
use meridian_shared::types::{AccountGroupId, AccountId, SubGroupId};
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::error::IntegrityError;
use crate::store::{LedgerStore, lock};

/// Input for registering an account group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    /// Unique group code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Group classification.
    pub kind: GroupKind,
}

/// Input for registering an account sub-group.
#[derive(Debug, Clone)]
pub struct NewSubGroup {
    /// Unique sub-group code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// The owning group.
    pub parent_group: AccountGroupId,
    /// Optional nesting under another sub-group.
    pub parent_sub_group: Option<SubGroupId>,
}

/// Input for registering a ledger account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Unique account code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Account classification.
    pub kind: AccountKind,
    /// Override for the balance-normal side; defaults to the side implied
    /// by `kind`.
    pub normal_side: Option<NormalSide>,
    /// Optional hierarchy parent.
    pub parent: Option<AccountParent>,
    /// Balance carried in at creation.
    pub opening_balance: Decimal,
}

/// Query and registration service over the chart of accounts.
///
/// All methods are safe to call concurrently with postings; reads observe
/// either the pre- or post-state of an in-flight posting, never a torn one.
#[derive(Clone)]
pub struct ChartService {
    store: Arc<LedgerStore>,
    config: HierarchyConfig,
}

impl ChartService {
    /// Creates a chart service over a store.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>, config: HierarchyConfig) -> Self {
        Self { store, config }
    }

    /// Registers a top-level account group.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::EmptyCode`] for a blank code.
    pub fn create_group(&self, input: NewGroup) -> Result<AccountGroup, ChartError> {
        if input.code.trim().is_empty() {
            return Err(ChartError::EmptyCode);
        }
        let group = AccountGroup {
            id: AccountGroupId::new(),
            code: input.code,
            name: input.name,
            kind: input.kind,
        };
        self.store.insert_group(group.clone());
        Ok(group)
    }

    /// Registers a sub-group after validating its place in the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns a [`ChartError`] if the parent group or sub-group is
    /// missing, or if linking would create a cycle.
    pub fn create_sub_group(&self, input: NewSubGroup) -> Result<AccountSubGroup, ChartError> {
        let sub_group = AccountSubGroup {
            id: SubGroupId::new(),
            code: input.code,
            name: input.name,
            parent_group: input.parent_group,
            parent_sub_group: input.parent_sub_group,
        };

        let groups = self.store.groups_snapshot();
        let sub_groups = self.store.sub_groups_snapshot();
        validate_sub_group(&sub_group, &groups, &sub_groups, self.config.max_depth)?;

        self.store.insert_sub_group(sub_group.clone());
        Ok(sub_group)
    }

    /// Checks a sub-group's place in the hierarchy without registering it.
    ///
    /// # Errors
    ///
    /// Returns a [`ChartError`] if the parent group or sub-group is
    /// missing, or if the parent chain cycles or exceeds the depth guard.
    pub fn validate_hierarchy(&self, sub_group: &AccountSubGroup) -> Result<(), ChartError> {
        let groups = self.store.groups_snapshot();
        let sub_groups = self.store.sub_groups_snapshot();
        validate_sub_group(sub_group, &groups, &sub_groups, self.config.max_depth)
    }

    /// Registers a postable ledger account.
    ///
    /// # Errors
    ///
    /// Returns a [`ChartError`] for a blank or duplicate code, or a parent
    /// that does not exist.
    pub fn create_account(&self, input: NewAccount) -> Result<Account, ChartError> {
        if input.code.trim().is_empty() {
            return Err(ChartError::EmptyCode);
        }
        if let Some(parent) = input.parent {
            let groups = self.store.groups_snapshot();
            let sub_groups = self.store.sub_groups_snapshot();
            account_parent_exists(parent, &groups, &sub_groups)?;
        }

        let account = Account {
            id: AccountId::new(),
            code: input.code,
            name: input.name,
            kind: input.kind,
            normal_side: input.normal_side.unwrap_or_else(|| input.kind.normal_side()),
            parent: input.parent,
            opening_balance: input.opening_balance,
            current_balance: input.opening_balance,
            is_active: true,
        };
        self.store.insert_account(account.clone())?;
        Ok(account)
    }

    /// Resolves an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::AccountNotFound`] for an unknown id.
    pub fn resolve(&self, id: AccountId) -> Result<Account, ChartError> {
        self.store
            .account_snapshot(id)
            .ok_or(ChartError::AccountNotFound(id))
    }

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::AccountNotFound`] for an unknown id.
    pub fn set_active(&self, id: AccountId, is_active: bool) -> Result<(), ChartError> {
        let cell = self
            .store
            .account_cell(id)
            .ok_or(ChartError::AccountNotFound(id))?;
        lock(&cell).account.is_active = is_active;
        Ok(())
    }

    /// Recomputes an account's balance from its posted history.
    ///
    /// Read-only aggregation: opening balance plus the signed sum of every
    /// posted line dated on or before `as_of`. Used for audits and for
    /// reconciliation against the incrementally maintained balance.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::AccountNotFound`] for an unknown id.
    pub fn compute_balance(&self, id: AccountId, as_of: NaiveDate) -> Result<Decimal, ChartError> {
        let account = self.resolve(id)?;
        Ok(self.recompute_from_lines(&account, as_of))
    }

    /// Verifies that an account's incremental balance matches its posted
    /// history, freezing the account on drift.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::AccountNotFound`] for an unknown id, or
    /// surfaces [`IntegrityError::BalanceDrift`] as a system alert after
    /// freezing the account.
    pub fn reconcile(&self, id: AccountId) -> Result<Decimal, ReconcileError> {
        let cell = self
            .store
            .account_cell(id)
            .ok_or(ReconcileError::Chart(ChartError::AccountNotFound(id)))?;

        // Holding the cell lock pins the balance: no posting can be
        // mid-application on this account while we recompute.
        let mut guard = lock(&cell);
        let recomputed = self.recompute_from_lines(&guard.account, NaiveDate::MAX);
        let incremental = guard.account.current_balance;

        if recomputed == incremental {
            return Ok(incremental);
        }

        guard.frozen = true;
        let err = IntegrityError::BalanceDrift {
            account_id: id,
            incremental,
            recomputed,
        };
        error!(
            account = %guard.account.code,
            %incremental,
            %recomputed,
            "balance drift detected; account frozen"
        );
        Err(ReconcileError::Integrity(err))
    }

    /// Clears an integrity freeze after operator resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::AccountNotFound`] for an unknown id.
    pub fn clear_freeze(&self, id: AccountId) -> Result<(), ChartError> {
        let cell = self
            .store
            .account_cell(id)
            .ok_or(ChartError::AccountNotFound(id))?;
        lock(&cell).frozen = false;
        info!(account_id = %id, "integrity freeze cleared");
        Ok(())
    }

    fn recompute_from_lines(&self, account: &Account, as_of: NaiveDate) -> Decimal {
        let mut balance = account.opening_balance;
        for entry in self.store.entries_snapshot() {
            if entry.posted_at.is_none() || entry.date > as_of {
                continue;
            }
            for line in &entry.lines {
                if line.account_id == account.id {
                    balance += account.normal_side.balance_change(line.debit, line.credit);
                }
            }
        }
        balance
    }
}

/// Outcome of a reconciliation that did not verify cleanly.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The account could not be resolved.
    #[error(transparent)]
    Chart(#[from] ChartError),
    /// The balance has drifted; the account is now frozen.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}
