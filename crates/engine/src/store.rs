//! In-memory ledger store.
//!
//! Tables are independent lock domains so readers and writers only contend
//! where they actually overlap:
//!
//! - accounts live in a concurrent map of individually locked cells; a
//!   posting locks exactly the cells it touches, in sorted id order
//! - journal entries are an append-only map behind a read/write lock; an
//!   entry is inserted complete, so readers never observe a torn one
//! - the audit log is append-only
//!
//! Lock ordering: account cells (sorted) -> entries -> audit. Every code
//! path acquires locks in that order, so the store cannot deadlock.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use meridian_core::billwise::{Bill, BillError};
use meridian_core::chart::{Account, AccountGroup, AccountSubGroup, ChartError};
use meridian_core::journal::{AccountStatus, EntryStatus, JournalEntry};
use meridian_shared::types::{AccountGroupId, AccountId, BillId, JournalEntryId, SubGroupId};

use crate::audit::AuditRecord;

/// Acquires a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Acquires a read lock, recovering the data if a holder panicked.
pub(crate) fn read<T>(rw: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rw.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquires a write lock, recovering the data if a holder panicked.
pub(crate) fn write<T>(rw: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rw.write().unwrap_or_else(PoisonError::into_inner)
}

/// An account and its integrity-freeze flag, locked as one unit.
#[derive(Debug)]
pub struct AccountCell {
    /// The account record, including its incrementally maintained balance.
    pub account: Account,
    /// Set when reconciliation detects drift; frozen accounts reject
    /// posting until an operator clears the flag.
    pub frozen: bool,
}

#[derive(Debug, Default)]
struct BillBook {
    bills: HashMap<BillId, Bill>,
    references: HashSet<(AccountId, String)>,
}

/// The in-process ledger store.
#[derive(Debug, Default)]
pub struct LedgerStore {
    groups: RwLock<HashMap<AccountGroupId, AccountGroup>>,
    sub_groups: RwLock<HashMap<SubGroupId, AccountSubGroup>>,
    accounts: dashmap::DashMap<AccountId, Arc<Mutex<AccountCell>>>,
    account_codes: Mutex<HashSet<String>>,
    entries: RwLock<HashMap<JournalEntryId, JournalEntry>>,
    entry_seq: AtomicU64,
    audit: Mutex<Vec<AuditRecord>>,
    bills: Mutex<BillBook>,
    pub(crate) reversal_lock: Mutex<()>,
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Hierarchy ==========

    /// Inserts an account group.
    pub fn insert_group(&self, group: AccountGroup) {
        write(&self.groups).insert(group.id, group);
    }

    /// Inserts an account sub-group.
    pub fn insert_sub_group(&self, sub_group: AccountSubGroup) {
        write(&self.sub_groups).insert(sub_group.id, sub_group);
    }

    /// Returns a snapshot of all account groups.
    #[must_use]
    pub fn groups_snapshot(&self) -> HashMap<AccountGroupId, AccountGroup> {
        read(&self.groups).clone()
    }

    /// Returns a snapshot of all account sub-groups.
    #[must_use]
    pub fn sub_groups_snapshot(&self) -> HashMap<SubGroupId, AccountSubGroup> {
        read(&self.sub_groups).clone()
    }

    // ========== Accounts ==========

    /// Inserts an account, enforcing code uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::DuplicateCode`] if the code is already
    /// registered.
    pub fn insert_account(&self, account: Account) -> Result<(), ChartError> {
        let mut codes = lock(&self.account_codes);
        if !codes.insert(account.code.clone()) {
            return Err(ChartError::DuplicateCode(account.code));
        }
        self.accounts.insert(
            account.id,
            Arc::new(Mutex::new(AccountCell {
                account,
                frozen: false,
            })),
        );
        Ok(())
    }

    /// Returns the lockable cell for an account.
    #[must_use]
    pub fn account_cell(&self, id: AccountId) -> Option<Arc<Mutex<AccountCell>>> {
        self.accounts.get(&id).map(|cell| Arc::clone(&cell))
    }

    /// Returns a point-in-time copy of an account.
    #[must_use]
    pub fn account_snapshot(&self, id: AccountId) -> Option<Account> {
        self.account_cell(id)
            .map(|cell| lock(&cell).account.clone())
    }

    /// Returns point-in-time copies of every account.
    #[must_use]
    pub fn account_snapshots(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|entry| lock(entry.value()).account.clone())
            .collect()
    }

    /// Returns what the validator needs to know about an account.
    #[must_use]
    pub fn account_status(&self, id: AccountId) -> Option<AccountStatus> {
        self.account_cell(id).map(|cell| AccountStatus {
            is_active: lock(&cell).account.is_active,
        })
    }

    // ========== Journal entries ==========

    /// Issues the next sequential entry number.
    #[must_use]
    pub fn next_entry_number(&self) -> String {
        let n = self.entry_seq.fetch_add(1, Ordering::SeqCst) + 1;
        format!("JE{n:06}")
    }

    /// Inserts a journal entry.
    pub fn insert_entry(&self, entry: JournalEntry) {
        write(&self.entries).insert(entry.id, entry);
    }

    /// Returns a copy of a journal entry.
    #[must_use]
    pub fn entry(&self, id: JournalEntryId) -> Option<JournalEntry> {
        read(&self.entries).get(&id).cloned()
    }

    /// Returns copies of all journal entries.
    #[must_use]
    pub fn entries_snapshot(&self) -> Vec<JournalEntry> {
        read(&self.entries).values().cloned().collect()
    }

    /// Marks an entry reversed and links it to its reversal.
    pub(crate) fn mark_reversed(&self, original: JournalEntryId, reversal: JournalEntryId) {
        let mut entries = write(&self.entries);
        if let Some(entry) = entries.get_mut(&original) {
            entry.status = EntryStatus::Reversed;
            entry.reversed_by = Some(reversal);
        }
    }

    // ========== Audit log ==========

    /// Appends audit records.
    pub(crate) fn push_audit(&self, records: Vec<AuditRecord>) {
        lock(&self.audit).extend(records);
    }

    /// Returns a copy of the full audit log, in append order.
    #[must_use]
    pub fn audit_log(&self) -> Vec<AuditRecord> {
        lock(&self.audit).clone()
    }

    /// Returns the audit records written for one entry.
    #[must_use]
    pub fn audit_for_entry(&self, entry_id: JournalEntryId) -> Vec<AuditRecord> {
        lock(&self.audit)
            .iter()
            .filter(|r| r.entry_id == entry_id)
            .cloned()
            .collect()
    }

    // ========== Bills ==========

    /// Inserts a bill, enforcing per-account reference uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::DuplicateReference`] if the account already
    /// tracks a bill with this reference.
    pub fn insert_bill(&self, bill: Bill) -> Result<(), BillError> {
        let mut book = lock(&self.bills);
        let key = (bill.account_id, bill.reference.clone());
        if book.references.contains(&key) {
            return Err(BillError::DuplicateReference {
                reference: bill.reference,
            });
        }
        book.references.insert(key);
        book.bills.insert(bill.id, bill);
        Ok(())
    }

    /// Returns a copy of a bill.
    #[must_use]
    pub fn bill(&self, id: BillId) -> Option<Bill> {
        lock(&self.bills).bills.get(&id).cloned()
    }

    /// Mutates a bill under the bill-book lock, returning the updated copy.
    ///
    /// The mutation runs while the lock is held, so concurrent payments on
    /// the same bill serialize and no allocation is lost.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::BillNotFound`] for an unknown id, or whatever
    /// error the mutation itself produced (in which case the bill is left
    /// as the mutation left it - mutations must not partially apply).
    pub fn with_bill_mut<F>(&self, id: BillId, mutate: F) -> Result<Bill, BillError>
    where
        F: FnOnce(&mut Bill) -> Result<(), BillError>,
    {
        let mut book = lock(&self.bills);
        let bill = book.bills.get_mut(&id).ok_or(BillError::BillNotFound(id))?;
        mutate(bill)?;
        Ok(bill.clone())
    }

    /// Returns copies of all bills on an account.
    #[must_use]
    pub fn bills_for_account(&self, account_id: AccountId) -> Vec<Bill> {
        lock(&self.bills)
            .bills
            .values()
            .filter(|b| b.account_id == account_id)
            .cloned()
            .collect()
    }
}
