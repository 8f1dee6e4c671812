//! Reversing entry construction.
//!
//! A posted entry is never mutated; cancelling its effect means posting a
//! new entry whose lines have debit and credit swapped, linked back to the
//! original.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{DraftJournalEntry, DraftJournalLine, JournalEntry};

/// Stateless builder for reversing entries.
pub struct ReversalBuilder;

impl ReversalBuilder {
    /// Builds the mirrored draft that cancels `original`.
    ///
    /// For each original line:
    /// - Debits become credits and credits become debits
    /// - The account and amount are preserved
    /// - The description is prefixed with "Reversal: "
    #[must_use]
    pub fn reversing_draft(original: &JournalEntry, date: NaiveDate) -> DraftJournalEntry {
        let lines = original
            .lines
            .iter()
            .map(|line| DraftJournalLine {
                account_id: line.account_id.to_string(),
                debit: line.credit,
                credit: line.debit,
                description: Some(format!(
                    "Reversal: {}",
                    line.description.clone().unwrap_or_default()
                )),
            })
            .collect();

        DraftJournalEntry {
            date: Some(date.format("%Y-%m-%d").to_string()),
            description: format!("Reversal of {}", original.entry_number),
            lines,
        }
    }

    /// Validates that the entry being reversed is itself balanced.
    ///
    /// This should always hold for posted entries; a mismatch means the
    /// stored entry was corrupted and must not be mirrored.
    #[must_use]
    pub fn validate_reversal(original: &JournalEntry) -> bool {
        let total_debit: Decimal = original.lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = original.lines.iter().map(|l| l.credit).sum();

        total_debit == total_credit
    }
}
