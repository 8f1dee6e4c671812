//! Journal entries and double-entry validation.
//!
//! This module implements:
//! - Draft and posted journal entry types
//! - The double-entry validation rules (all violations collected)
//! - Reversing entry construction
//! - Entry totals and the balance tolerance

pub mod reversal;
pub mod types;
pub mod validation;

pub use reversal::ReversalBuilder;
pub use types::{
    BALANCE_TOLERANCE, DraftJournalEntry, DraftJournalLine, EntryStatus, EntryTotals, JournalEntry,
    JournalLine,
};
pub use validation::{AccountStatus, JournalValidator, ValidationIssue, ValidationReport};
