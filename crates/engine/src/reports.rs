//! Read-only ledger reports.
//!
//! Aggregations over posted history. Safe to call repeatedly and safe to
//! call concurrently with postings: an in-flight posting's entry is either
//! fully visible or not yet visible, never partially applied.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use meridian_core::chart::ChartError;
use meridian_core::reports::{
    LedgerStatement, Movement, StatementBuilder, TrialBalance, TrialBalanceReport, TrialBalanceRow,
};
use meridian_shared::types::AccountId;
use rust_decimal::Decimal;
use tracing::error;

use crate::error::IntegrityError;
use crate::store::LedgerStore;

/// Trial balance and statement queries.
#[derive(Clone)]
pub struct TrialBalanceCalculator {
    store: Arc<LedgerStore>,
}

impl TrialBalanceCalculator {
    /// Creates a calculator over a store.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Computes the trial balance as of a date.
    ///
    /// Aggregates only posted entries dated on or before `as_of`, one row
    /// per account. An unbalanced result is logged as a system-integrity
    /// alert - it means the posting engine itself is defective, not that a
    /// caller supplied bad input.
    #[must_use]
    pub fn trial_balance(&self, as_of: NaiveDate) -> TrialBalanceReport {
        let mut per_account: HashMap<AccountId, (Decimal, Decimal)> = HashMap::new();
        for entry in self.store.entries_snapshot() {
            if entry.posted_at.is_none() || entry.date > as_of {
                continue;
            }
            for line in &entry.lines {
                let slot = per_account.entry(line.account_id).or_default();
                slot.0 += line.debit;
                slot.1 += line.credit;
            }
        }

        let rows = self
            .store
            .account_snapshots()
            .into_iter()
            .map(|account| {
                let (debit_total, credit_total) = per_account
                    .get(&account.id)
                    .copied()
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                TrialBalanceRow {
                    account_id: account.id,
                    code: account.code,
                    name: account.name,
                    debit_total,
                    credit_total,
                }
            })
            .collect();

        let report = TrialBalance::assemble(as_of, rows);
        if !report.totals.is_balanced {
            error!(
                %as_of,
                total_debit = %report.totals.total_debit,
                total_credit = %report.totals.total_credit,
                "trial balance does not balance - posting engine defect"
            );
        }
        report
    }

    /// Computes the trial balance and fails loudly if it does not balance.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::TrialBalanceBroken`] carrying the grand
    /// totals when debits and credits disagree.
    pub fn check(&self, as_of: NaiveDate) -> Result<TrialBalanceReport, IntegrityError> {
        let report = self.trial_balance(as_of);
        if report.totals.is_balanced {
            Ok(report)
        } else {
            Err(IntegrityError::TrialBalanceBroken {
                as_of,
                debits: report.totals.total_debit,
                credits: report.totals.total_credit,
            })
        }
    }

    /// Builds an account's posted-line statement with running balances.
    ///
    /// Movements dated before `from` are folded into the statement's
    /// opening balance; movements after `to` are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::AccountNotFound`] for an unknown account.
    pub fn account_ledger(
        &self,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<LedgerStatement, ChartError> {
        let account = self
            .store
            .account_snapshot(account_id)
            .ok_or(ChartError::AccountNotFound(account_id))?;

        let mut opening = account.opening_balance;
        let mut movements = Vec::new();

        let mut entries = self.store.entries_snapshot();
        entries.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.entry_number.cmp(&b.entry_number))
        });

        for entry in entries {
            if entry.posted_at.is_none() {
                continue;
            }
            if to.is_some_and(|cutoff| entry.date > cutoff) {
                continue;
            }
            for line in &entry.lines {
                if line.account_id != account_id {
                    continue;
                }
                if from.is_some_and(|start| entry.date < start) {
                    opening += account.normal_side.balance_change(line.debit, line.credit);
                } else {
                    movements.push(Movement {
                        date: entry.date,
                        entry_number: entry.entry_number.clone(),
                        description: line
                            .description
                            .clone()
                            .or_else(|| Some(entry.description.clone())),
                        debit: line.debit,
                        credit: line.credit,
                    });
                }
            }
        }

        Ok(StatementBuilder::build(&account, opening, movements))
    }
}
