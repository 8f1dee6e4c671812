//! Per-account ledger statements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chart::Account;

/// One posted movement on an account, before running-balance assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry number of the journal entry this line belongs to.
    pub entry_number: String,
    /// Line or entry description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// A statement line with its running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry number.
    pub entry_number: String,
    /// Line or entry description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Account balance after this line.
    pub running_balance: Decimal,
}

/// The posted history of a single account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStatement {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Balance before the first listed line.
    pub opening_balance: Decimal,
    /// Balance after the last listed line.
    pub closing_balance: Decimal,
    /// Statement lines in posting order.
    pub lines: Vec<StatementLine>,
}

/// Stateless statement assembly.
pub struct StatementBuilder;

impl StatementBuilder {
    /// Builds a statement by threading a running balance through the
    /// account's movements.
    ///
    /// `opening_balance` is the balance before the first listed movement -
    /// for a full-history statement, the account's own opening balance; for
    /// a date-ranged statement, the balance accumulated before the range.
    /// Movements are ordered by date, then entry number, so the running
    /// balance is deterministic. The sign convention follows the account's
    /// normal side.
    #[must_use]
    pub fn build(
        account: &Account,
        opening_balance: Decimal,
        mut movements: Vec<Movement>,
    ) -> LedgerStatement {
        movements.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.entry_number.cmp(&b.entry_number))
        });

        let mut running = opening_balance;
        let lines = movements
            .into_iter()
            .map(|m| {
                running += account.normal_side.balance_change(m.debit, m.credit);
                StatementLine {
                    date: m.date,
                    entry_number: m.entry_number,
                    description: m.description,
                    debit: m.debit,
                    credit: m.credit,
                    running_balance: running,
                }
            })
            .collect();

        LedgerStatement {
            code: account.code.clone(),
            name: account.name.clone(),
            opening_balance,
            closing_balance: running,
            lines,
        }
    }
}
