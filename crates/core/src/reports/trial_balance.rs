//! Trial balance assembly.

use chrono::NaiveDate;
use meridian_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::journal::BALANCE_TOLERANCE;

/// Per-account debit/credit totals over posted entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// The account.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Total posted debits.
    pub debit_total: Decimal,
    /// Total posted credits.
    pub credit_total: Decimal,
}

/// Grand totals across all accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of all debit totals.
    pub total_debit: Decimal,
    /// Sum of all credit totals.
    pub total_credit: Decimal,
    /// True iff total debits equal total credits within tolerance.
    ///
    /// This must always hold if posting is correct; a false value is a
    /// system-integrity alert, not a user error.
    pub is_balanced: bool,
}

/// A trial balance as of a given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Only entries dated on or before this date are included.
    pub as_of: NaiveDate,
    /// Per-account rows, ordered by account code.
    pub rows: Vec<TrialBalanceRow>,
    /// Grand totals.
    pub totals: TrialBalanceTotals,
}

/// Stateless trial balance assembly.
pub struct TrialBalance;

impl TrialBalance {
    /// Assembles a report from per-account totals.
    #[must_use]
    pub fn assemble(as_of: NaiveDate, mut rows: Vec<TrialBalanceRow>) -> TrialBalanceReport {
        rows.sort_by(|a, b| a.code.cmp(&b.code));

        let total_debit: Decimal = rows.iter().map(|r| r.debit_total).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit_total).sum();
        let is_balanced = (total_debit - total_credit).abs() <= BALANCE_TOLERANCE;

        TrialBalanceReport {
            as_of,
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced,
            },
        }
    }
}
