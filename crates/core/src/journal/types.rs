//! Journal entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use meridian_shared::types::{AccountId, ActorId, JournalEntryId, JournalLineId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tolerance within which an entry's debit and credit totals must agree.
///
/// 0.01 in the ledger currency's smallest customary unit.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Journal entry lifecycle status.
///
/// Entries are created as drafts, become immutable once posted, and are
/// cancelled only by posting a mirrored reversal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and has not touched any balance.
    Draft,
    /// Entry has been posted to the ledger (immutable).
    Posted,
    /// Entry was posted and later cancelled by a reversal entry.
    Reversed,
}

impl EntryStatus {
    /// Returns true if the entry's balance effects have been applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }
}

/// A candidate journal line as submitted by a caller.
///
/// The account id is carried as a string so a malformed identifier can be
/// reported separately from one that does not resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftJournalLine {
    /// The account to post to, as an identifier string.
    pub account_id: String,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional description for this line item.
    pub description: Option<String>,
}

/// A candidate journal entry as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftJournalEntry {
    /// Entry date in ISO-8601 (`YYYY-MM-DD`) form.
    pub date: Option<String>,
    /// Entry description.
    pub description: String,
    /// Candidate lines (at least two required).
    pub lines: Vec<DraftJournalLine>,
}

impl DraftJournalEntry {
    /// Parses the entry date, if present and well-formed.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    }

    /// Returns the debit/credit totals over all lines.
    #[must_use]
    pub fn totals(&self) -> EntryTotals {
        let debit: Decimal = self.lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = self.lines.iter().map(|l| l.credit).sum();
        EntryTotals::new(debit, credit)
    }
}

/// A single line of a posted journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier for this line.
    pub id: JournalLineId,
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional description for this line item.
    pub description: Option<String>,
}

/// A journal entry.
///
/// Once posted, the entry is append-only history: balances are adjusted,
/// an audit record is written per line, and the only way to undo the effect
/// is a mirrored reversal entry referencing this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Sequential, human-readable entry number (`JE000001`).
    pub entry_number: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Balanced lines (at least two).
    pub lines: Vec<JournalLine>,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// The actor who created the entry.
    pub created_by: ActorId,
    /// Set on reversal entries: the entry this one cancels.
    pub reversal_of: Option<JournalEntryId>,
    /// Set on reversed entries: the reversal that cancelled this one.
    pub reversed_by: Option<JournalEntryId>,
}

impl JournalEntry {
    /// Returns the debit/credit totals over all lines.
    #[must_use]
    pub fn totals(&self) -> EntryTotals {
        let debit: Decimal = self.lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = self.lines.iter().map(|l| l.credit).sum();
        EntryTotals::new(debit, credit)
    }
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Whether debits and credits agree within [`BALANCE_TOLERANCE`].
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates entry totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        let is_balanced = (total_debit - total_credit).abs() <= BALANCE_TOLERANCE;
        Self {
            total_debit,
            total_credit,
            is_balanced,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}
