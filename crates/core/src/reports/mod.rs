//! Ledger report calculations.
//!
//! Pure assembly of read-only reports from posted-line aggregates:
//! - Trial balance with the debits-equal-credits check
//! - Per-account ledger statements with running balances

pub mod statement;
pub mod trial_balance;

pub use statement::{LedgerStatement, Movement, StatementBuilder, StatementLine};
pub use trial_balance::{TrialBalance, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals};
