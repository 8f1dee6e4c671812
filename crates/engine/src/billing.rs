//! Bill-wise sub-ledger tracking.
//!
//! Bills attach invoice-level detail to receivable/payable accounts. Every
//! payment allocation must name the posted journal entry that recorded the
//! cash movement - the link is a hard invariant, so the bill sub-ledger can
//! always be traced back to general ledger history.

use std::sync::Arc;

use chrono::NaiveDate;
use meridian_core::billwise::{Bill, BillError, BillPayment, BillSummary};
use meridian_shared::types::{AccountId, BillId, JournalEntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::LedgerStore;

/// An account's bills with aggregate figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillStatement {
    /// The account the statement covers.
    pub account_id: AccountId,
    /// Bills, most recent bill date first.
    pub bills: Vec<Bill>,
    /// Aggregate figures.
    pub summary: BillSummary,
}

/// Bill-wise sub-ledger service.
#[derive(Clone)]
pub struct BillTracker {
    store: Arc<LedgerStore>,
}

impl BillTracker {
    /// Creates a bill tracker over a store.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Creates a bill on an account.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::AccountNotFound`] for an unknown account,
    /// [`BillError::NonPositiveAmount`] for a non-positive amount, and
    /// [`BillError::DuplicateReference`] if the account already tracks a
    /// bill with this reference.
    pub fn create_bill(
        &self,
        account_id: AccountId,
        reference: &str,
        amount: Decimal,
        bill_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<Bill, BillError> {
        if self.store.account_snapshot(account_id).is_none() {
            return Err(BillError::AccountNotFound(account_id));
        }

        let bill = Bill::new(account_id, reference, amount, bill_date, due_date)?;
        self.store.insert_bill(bill.clone())?;
        info!(
            bill = %bill.reference,
            account_id = %account_id,
            amount = %amount,
            "bill created"
        );
        Ok(bill)
    }

    /// Allocates a payment against a bill.
    ///
    /// The payment must reference the posted journal entry that recorded
    /// the cash movement. On any error the bill is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::PaymentEntryNotFound`] /
    /// [`BillError::PaymentEntryNotPosted`] when the journal link does not
    /// hold, [`BillError::BillNotFound`] for an unknown bill, and
    /// [`BillError::Overpayment`] if the amount exceeds the outstanding
    /// balance.
    pub fn record_payment(
        &self,
        bill_id: BillId,
        amount: Decimal,
        date: NaiveDate,
        journal_entry_id: JournalEntryId,
    ) -> Result<Bill, BillError> {
        let entry = self
            .store
            .entry(journal_entry_id)
            .ok_or(BillError::PaymentEntryNotFound(journal_entry_id))?;
        if entry.posted_at.is_none() {
            return Err(BillError::PaymentEntryNotPosted(journal_entry_id));
        }

        let updated = self.store.with_bill_mut(bill_id, |bill| {
            bill.apply_payment(BillPayment {
                amount,
                date,
                journal_entry_id,
            })
        })?;

        info!(
            bill = %updated.reference,
            amount = %amount,
            balance = %updated.balance_amount,
            status = ?updated.status,
            "bill payment recorded"
        );
        Ok(updated)
    }

    /// Returns a bill by id.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::BillNotFound`] for an unknown id.
    pub fn bill(&self, bill_id: BillId) -> Result<Bill, BillError> {
        self.store
            .bill(bill_id)
            .ok_or(BillError::BillNotFound(bill_id))
    }

    /// Returns an account's bills and summary figures.
    ///
    /// Read-only; safe to call repeatedly and concurrently with postings.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::AccountNotFound`] for an unknown account.
    pub fn statement(&self, account_id: AccountId) -> Result<BillStatement, BillError> {
        if self.store.account_snapshot(account_id).is_none() {
            return Err(BillError::AccountNotFound(account_id));
        }

        let mut bills = self.store.bills_for_account(account_id);
        bills.sort_by(|a, b| b.bill_date.cmp(&a.bill_date));
        let summary = BillSummary::from_bills(&bills);

        Ok(BillStatement {
            account_id,
            bills,
            summary,
        })
    }
}
