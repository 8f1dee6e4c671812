//! Atomic journal posting and reversal.
//!
//! `post` applies a validated entry as a single all-or-nothing unit: every
//! referenced account is resolved and locked (in sorted id order, so two
//! concurrent postings can never deadlock) before the first balance is
//! touched. Once mutation begins there are no failure paths, so a posting
//! either lands completely or leaves no trace.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use meridian_core::journal::{
    DraftJournalEntry, DraftJournalLine, EntryStatus, JournalEntry, JournalLine, JournalValidator,
    ReversalBuilder,
};
use meridian_shared::types::{AccountId, Actor, AuditRecordId, JournalEntryId, JournalLineId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::AuditRecord;
use crate::error::PostingError;
use crate::store::{LedgerStore, lock};

/// The balance movement one posting applied to one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceDelta {
    /// The adjusted account.
    pub account_id: AccountId,
    /// Net signed change across all of the entry's lines on this account.
    pub delta: Decimal,
    /// Balance before the posting.
    pub previous_balance: Decimal,
    /// Balance after the posting.
    pub new_balance: Decimal,
}

/// The result of a successful posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingReceipt {
    /// The posted entry.
    pub entry: JournalEntry,
    /// Per-account balance movements, in account id order.
    pub deltas: Vec<BalanceDelta>,
}

/// The posting engine.
///
/// Cheap to clone; clones share the same underlying store.
#[derive(Clone)]
pub struct PostingEngine {
    store: Arc<LedgerStore>,
}

impl PostingEngine {
    /// Creates a posting engine over a store.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Validates and posts a draft entry.
    ///
    /// Validation is re-run here regardless of what the caller already
    /// checked - a validation performed in another process is never
    /// trusted.
    ///
    /// # Errors
    ///
    /// Returns a [`PostingError`] and leaves every balance untouched if
    /// the draft fails validation, any account cannot be resolved, or any
    /// touched account is frozen.
    pub fn post(
        &self,
        draft: &DraftJournalEntry,
        actor: &Actor,
    ) -> Result<PostingReceipt, PostingError> {
        self.post_internal(draft, actor, None)
    }

    /// Reverses a posted entry by posting its mirror image.
    ///
    /// The reversal is linked to the original via `reversal_of`, and the
    /// original is marked reversed. The net effect of the pair on every
    /// touched account is zero.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::EntryNotFound`] / [`PostingError::EntryNotPosted`]
    /// if the entry does not resolve to posted history, and
    /// [`PostingError::AlreadyReversed`] on a second reversal attempt.
    pub fn reverse(
        &self,
        entry_id: JournalEntryId,
        actor: &Actor,
    ) -> Result<PostingReceipt, PostingError> {
        // Serializes reversals so two concurrent calls cannot both observe
        // the entry as un-reversed. Ordinary postings never take this lock.
        let _guard = lock(&self.store.reversal_lock);

        let original = self
            .store
            .entry(entry_id)
            .ok_or(PostingError::EntryNotFound(entry_id))?;

        match original.status {
            EntryStatus::Draft => return Err(PostingError::EntryNotPosted(entry_id)),
            EntryStatus::Reversed => return Err(PostingError::AlreadyReversed(entry_id)),
            EntryStatus::Posted => {}
        }
        if original.reversed_by.is_some() {
            return Err(PostingError::AlreadyReversed(entry_id));
        }
        if !ReversalBuilder::validate_reversal(&original) {
            return Err(PostingError::CorruptStoredEntry(entry_id));
        }

        let today = Utc::now().date_naive();
        let draft = ReversalBuilder::reversing_draft(&original, today);
        let receipt = self.post_internal(&draft, actor, Some(entry_id))?;

        self.store.mark_reversed(entry_id, receipt.entry.id);
        info!(
            original = %original.entry_number,
            reversal = %receipt.entry.entry_number,
            "journal entry reversed"
        );
        Ok(receipt)
    }

    fn post_internal(
        &self,
        draft: &DraftJournalEntry,
        actor: &Actor,
        reversal_of: Option<JournalEntryId>,
    ) -> Result<PostingReceipt, PostingError> {
        let report = JournalValidator::validate(draft, |id| self.store.account_status(id));
        if !report.is_valid {
            return Err(PostingError::Rejected(report));
        }
        let Some(date) = draft.parsed_date() else {
            // Validation guarantees a parseable date; kept total anyway.
            return Err(PostingError::Rejected(report));
        };

        let resolved = Self::resolve_line_accounts(&draft.lines)?;

        // Lock every touched account in sorted id order before mutating.
        let mut account_ids: Vec<AccountId> = resolved.iter().map(|(id, _)| *id).collect();
        account_ids.sort_unstable();
        account_ids.dedup();

        let cells = account_ids
            .iter()
            .map(|id| {
                self.store
                    .account_cell(*id)
                    .map(|cell| (*id, cell))
                    .ok_or(PostingError::AccountNotFound(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let index: HashMap<AccountId, usize> = account_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        let mut guards: Vec<_> = cells.iter().map(|(_, cell)| lock(cell)).collect();

        for guard in &guards {
            if guard.frozen {
                return Err(PostingError::AccountFrozen(guard.account.id));
            }
        }

        // Past this point there are no failure paths: the posting applies
        // in full while every touched account stays locked.
        let now = Utc::now();
        let entry_id = JournalEntryId::new();
        let entry_number = self.store.next_entry_number();

        let starting_balances: Vec<Decimal> = guards
            .iter()
            .map(|g| g.account.current_balance)
            .collect();

        let mut lines = Vec::with_capacity(resolved.len());
        let mut audit_records = Vec::with_capacity(resolved.len());
        for (account_id, draft_line) in &resolved {
            let slot = index[account_id];
            let guard = &mut guards[slot];

            let delta = guard
                .account
                .balance_change(draft_line.debit, draft_line.credit);
            let previous_balance = guard.account.current_balance;
            guard.account.current_balance += delta;

            audit_records.push(AuditRecord {
                id: AuditRecordId::new(),
                entry_id,
                account_id: *account_id,
                delta,
                previous_balance,
                new_balance: guard.account.current_balance,
                timestamp: now,
                actor_id: actor.id,
            });
            lines.push(JournalLine {
                id: JournalLineId::new(),
                account_id: *account_id,
                debit: draft_line.debit,
                credit: draft_line.credit,
                description: draft_line.description.clone(),
            });
        }

        let deltas: Vec<BalanceDelta> = account_ids
            .iter()
            .map(|id| {
                let slot = index[id];
                let new_balance = guards[slot].account.current_balance;
                BalanceDelta {
                    account_id: *id,
                    delta: new_balance - starting_balances[slot],
                    previous_balance: starting_balances[slot],
                    new_balance,
                }
            })
            .collect();

        let entry = JournalEntry {
            id: entry_id,
            entry_number,
            date,
            description: draft.description.clone(),
            lines,
            status: EntryStatus::Posted,
            posted_at: Some(now),
            created_by: actor.id,
            reversal_of,
            reversed_by: None,
        };

        // Entry and audit rows land while the account locks are held, so a
        // reconciling reader never sees a balance without its history.
        self.store.insert_entry(entry.clone());
        self.store.push_audit(audit_records);
        drop(guards);

        let totals = entry.totals();
        info!(
            entry = %entry.entry_number,
            total_debit = %totals.total_debit,
            total_credit = %totals.total_credit,
            lines = entry.lines.len(),
            actor = %actor.name,
            "journal entry posted"
        );

        Ok(PostingReceipt { entry, deltas })
    }

    fn resolve_line_accounts(
        lines: &[DraftJournalLine],
    ) -> Result<Vec<(AccountId, &DraftJournalLine)>, PostingError> {
        lines
            .iter()
            .map(|line| {
                AccountId::from_str(line.account_id.trim())
                    .map(|id| (id, line))
                    .map_err(|_| PostingError::MalformedAccountId(line.account_id.clone()))
            })
            .collect()
    }
}
