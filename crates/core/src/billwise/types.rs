//! Bill domain types and payment allocation rules.

use chrono::NaiveDate;
use meridian_shared::types::{AccountId, BillId, JournalEntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BillError;
use crate::journal::BALANCE_TOLERANCE;

/// Derived bill status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// No payment allocated yet.
    Unpaid,
    /// Partially paid.
    Partial,
    /// Settled in full (terminal).
    Paid,
}

impl BillStatus {
    /// Derives the status from paid and outstanding amounts.
    #[must_use]
    pub fn derive(paid_amount: Decimal, balance_amount: Decimal) -> Self {
        if paid_amount == Decimal::ZERO {
            Self::Unpaid
        } else if balance_amount <= BALANCE_TOLERANCE {
            Self::Paid
        } else {
            Self::Partial
        }
    }
}

/// A payment allocated against a bill.
///
/// Every payment references the journal entry that recorded the cash
/// movement, so the bill sub-ledger and the general ledger never drift
/// apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillPayment {
    /// Amount allocated.
    pub amount: Decimal,
    /// Payment date.
    pub date: NaiveDate,
    /// The posted journal entry recording the cash movement.
    pub journal_entry_id: JournalEntryId,
}

/// A tracked bill on a receivable/payable account.
///
/// Bills are never deleted; a bill only reaches the terminal `Paid` status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier.
    pub id: BillId,
    /// The account this bill belongs to.
    pub account_id: AccountId,
    /// Bill reference, unique per account.
    pub reference: String,
    /// Date the bill was raised.
    pub bill_date: NaiveDate,
    /// Date payment falls due.
    pub due_date: NaiveDate,
    /// Original bill amount.
    pub bill_amount: Decimal,
    /// Payment allocations, in order of receipt.
    pub payments: Vec<BillPayment>,
    /// Sum of all payment amounts.
    pub paid_amount: Decimal,
    /// Outstanding amount (`bill_amount - paid_amount`).
    pub balance_amount: Decimal,
    /// Derived status.
    pub status: BillStatus,
}

impl Bill {
    /// Creates a new unpaid bill.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NonPositiveAmount`] if the amount is not
    /// strictly positive.
    pub fn new(
        account_id: AccountId,
        reference: impl Into<String>,
        bill_amount: Decimal,
        bill_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<Self, BillError> {
        if bill_amount <= Decimal::ZERO {
            return Err(BillError::NonPositiveAmount);
        }

        Ok(Self {
            id: BillId::new(),
            account_id,
            reference: reference.into(),
            bill_date,
            due_date,
            bill_amount,
            payments: Vec::new(),
            paid_amount: Decimal::ZERO,
            balance_amount: bill_amount,
            status: BillStatus::Unpaid,
        })
    }

    /// Allocates a payment against this bill.
    ///
    /// Appends the payment, then rederives `paid_amount`, `balance_amount`,
    /// and `status`. On error the bill is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NonPositiveAmount`] for zero/negative payments
    /// and [`BillError::Overpayment`] if the amount exceeds the outstanding
    /// balance.
    pub fn apply_payment(&mut self, payment: BillPayment) -> Result<(), BillError> {
        if payment.amount <= Decimal::ZERO {
            return Err(BillError::NonPositiveAmount);
        }
        if payment.amount > self.balance_amount {
            return Err(BillError::Overpayment {
                amount: payment.amount,
                balance: self.balance_amount,
            });
        }

        self.payments.push(payment);
        self.paid_amount = self.payments.iter().map(|p| p.amount).sum();
        self.balance_amount = self.bill_amount - self.paid_amount;
        self.status = BillStatus::derive(self.paid_amount, self.balance_amount);
        Ok(())
    }
}

/// Aggregate figures for an account's bill statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    /// Number of bills.
    pub total_bills: usize,
    /// Sum of bill amounts.
    pub total_amount: Decimal,
    /// Sum of paid amounts.
    pub total_paid: Decimal,
    /// Sum of outstanding balances.
    pub total_balance: Decimal,
}

impl BillSummary {
    /// Summarizes a set of bills.
    #[must_use]
    pub fn from_bills(bills: &[Bill]) -> Self {
        Self {
            total_bills: bills.len(),
            total_amount: bills.iter().map(|b| b.bill_amount).sum(),
            total_paid: bills.iter().map(|b| b.paid_amount).sum(),
            total_balance: bills.iter().map(|b| b.balance_amount).sum(),
        }
    }
}
