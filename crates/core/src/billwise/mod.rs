//! Bill-wise sub-ledger arithmetic.
//!
//! Receivable/payable accounts track individual bills alongside the
//! account-level balance. Each bill accumulates payment allocations and
//! derives its status from the remaining balance.

pub mod error;
pub mod types;

pub use error::BillError;
pub use types::{Bill, BillPayment, BillStatus, BillSummary};
