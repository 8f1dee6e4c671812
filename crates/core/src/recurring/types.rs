//! Recurring definition types and state machine.
//!
//! A definition's full state space is {active, pending_approval, failed}
//! with explicit transition methods, so every reachable state is
//! enumerable and testable. Definitions are owned exclusively by the
//! scheduler; nothing else mutates them.

use chrono::NaiveDate;
use meridian_shared::types::{AccountId, JournalEntryId, RecurringEntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::frequency::Frequency;
use crate::journal::{DraftJournalEntry, DraftJournalLine};

/// Scheduler-visible status of a recurring definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionStatus {
    /// Eligible for generation when its next run date comes due.
    Active,
    /// A generated draft is held awaiting approval.
    PendingApproval,
    /// The last generation attempt failed; waiting for retry or operator.
    Failed,
}

/// One line of an entry template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional description for this line item.
    pub description: Option<String>,
}

/// A journal entry shape without a date.
///
/// Materialized into a dated draft on every due occurrence; the draft then
/// flows through the same validation and posting path as a manual entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryTemplate {
    /// Description stamped on generated entries.
    pub description: String,
    /// Template lines.
    pub lines: Vec<TemplateLine>,
}

impl EntryTemplate {
    /// Materializes the template into a draft dated `date`.
    #[must_use]
    pub fn materialize(&self, date: NaiveDate) -> DraftJournalEntry {
        DraftJournalEntry {
            date: Some(date.format("%Y-%m-%d").to_string()),
            description: self.description.clone(),
            lines: self
                .lines
                .iter()
                .map(|line| DraftJournalLine {
                    account_id: line.account_id.to_string(),
                    debit: line.debit,
                    credit: line.credit,
                    description: line.description.clone(),
                })
                .collect(),
        }
    }
}

/// A recurring journal entry definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDefinition {
    /// Unique identifier.
    pub id: RecurringEntryId,
    /// Human-readable name.
    pub name: String,
    /// Generation cadence.
    pub frequency: Frequency,
    /// The entry shape generated on each occurrence.
    pub template: EntryTemplate,
    /// Next date an occurrence comes due.
    pub next_run_date: NaiveDate,
    /// Deactivated definitions are skipped by ticks.
    pub is_active: bool,
    /// Whether generated drafts require approval before posting.
    pub approval_required: bool,
    /// Failed generation attempts since the last success.
    pub retry_count: u32,
    /// Retry ceiling; once reached, the definition stays failed until an
    /// operator intervenes.
    pub max_retries: u32,
    /// Why the last attempt failed.
    pub failure_reason: Option<String>,
    /// The most recently posted entry generated from this definition.
    pub last_generated_entry: Option<JournalEntryId>,
    /// Current state-machine status.
    pub status: DefinitionStatus,
    /// Draft held while awaiting approval.
    pub held_draft: Option<DraftJournalEntry>,
}

impl RecurringDefinition {
    /// Creates an active definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        template: EntryTemplate,
        next_run_date: NaiveDate,
        approval_required: bool,
        max_retries: u32,
    ) -> Self {
        Self {
            id: RecurringEntryId::new(),
            name: name.into(),
            frequency,
            template,
            next_run_date,
            is_active: true,
            approval_required,
            retry_count: 0,
            max_retries,
            failure_reason: None,
            last_generated_entry: None,
            status: DefinitionStatus::Active,
            held_draft: None,
        }
    }

    /// Returns true if a tick at `today` should generate an occurrence.
    #[must_use]
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.is_active && self.status == DefinitionStatus::Active && self.next_run_date <= today
    }

    /// Returns true if a failed definition may still be retried.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Holds a generated draft for approval.
    pub fn hold_for_approval(&mut self, draft: DraftJournalEntry) {
        self.held_draft = Some(draft);
        self.status = DefinitionStatus::PendingApproval;
    }

    /// Takes the held draft for posting, leaving the definition pending
    /// until the outcome is recorded.
    pub fn take_held_draft(&mut self) -> Option<DraftJournalEntry> {
        self.held_draft.take()
    }

    /// Records a successfully posted occurrence: the schedule advances one
    /// period and the failure bookkeeping resets.
    pub fn record_success(&mut self, entry_id: JournalEntryId) {
        self.last_generated_entry = Some(entry_id);
        self.next_run_date = self.frequency.advance(self.next_run_date);
        self.retry_count = 0;
        self.failure_reason = None;
        self.held_draft = None;
        self.status = DefinitionStatus::Active;
    }

    /// Records a failed generation or posting attempt.
    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.retry_count += 1;
        self.failure_reason = Some(reason.into());
        self.held_draft = None;
        self.status = DefinitionStatus::Failed;
    }

    /// Advances the schedule one period without generating an entry.
    ///
    /// Does not touch `retry_count`.
    pub fn skip_next(&mut self) {
        self.next_run_date = self.frequency.advance(self.next_run_date);
    }

    /// Discards the held draft and consumes the occurrence without posting.
    pub fn reject_held(&mut self) {
        self.held_draft = None;
        self.next_run_date = self.frequency.advance(self.next_run_date);
        self.status = DefinitionStatus::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_template() -> EntryTemplate {
        EntryTemplate {
            description: "Monthly rent".to_string(),
            lines: vec![
                TemplateLine {
                    account_id: AccountId::new(),
                    debit: dec!(1200),
                    credit: dec!(0),
                    description: Some("Rent expense".to_string()),
                },
                TemplateLine {
                    account_id: AccountId::new(),
                    debit: dec!(0),
                    credit: dec!(1200),
                    description: Some("Bank".to_string()),
                },
            ],
        }
    }

    fn make_definition() -> RecurringDefinition {
        RecurringDefinition::new(
            "Rent",
            Frequency::Monthly,
            make_template(),
            date(2026, 3, 1),
            false,
            3,
        )
    }

    #[test]
    fn test_materialize_stamps_date() {
        let template = make_template();
        let draft = template.materialize(date(2026, 3, 1));
        assert_eq!(draft.date.as_deref(), Some("2026-03-01"));
        assert_eq!(draft.description, "Monthly rent");
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].debit, dec!(1200));
        assert_eq!(
            draft.lines[0].account_id,
            template.lines[0].account_id.to_string()
        );
    }

    #[test]
    fn test_due_logic() {
        let def = make_definition();
        assert!(!def.is_due(date(2026, 2, 28)));
        assert!(def.is_due(date(2026, 3, 1)));
        assert!(def.is_due(date(2026, 3, 15)));
    }

    #[test]
    fn test_inactive_definition_never_due() {
        let mut def = make_definition();
        def.is_active = false;
        assert!(!def.is_due(date(2026, 3, 15)));
    }

    #[test]
    fn test_pending_definition_not_due() {
        let mut def = make_definition();
        let draft = def.template.materialize(date(2026, 3, 1));
        def.hold_for_approval(draft);
        assert_eq!(def.status, DefinitionStatus::PendingApproval);
        assert!(!def.is_due(date(2026, 3, 15)));
    }

    #[test]
    fn test_success_advances_and_resets() {
        let mut def = make_definition();
        def.record_failure("validator rejected entry");
        assert_eq!(def.status, DefinitionStatus::Failed);
        assert_eq!(def.retry_count, 1);

        let entry_id = JournalEntryId::new();
        def.record_success(entry_id);
        assert_eq!(def.status, DefinitionStatus::Active);
        assert_eq!(def.retry_count, 0);
        assert_eq!(def.failure_reason, None);
        assert_eq!(def.last_generated_entry, Some(entry_id));
        assert_eq!(def.next_run_date, date(2026, 4, 1));
    }

    #[test]
    fn test_failure_counts_up_to_ceiling() {
        let mut def = make_definition();
        for expected in 1..=3u32 {
            assert!(def.can_retry());
            def.record_failure("account frozen");
            assert_eq!(def.retry_count, expected);
            assert_eq!(def.status, DefinitionStatus::Failed);
        }
        assert!(!def.can_retry());
        // Schedule never advanced across failures.
        assert_eq!(def.next_run_date, date(2026, 3, 1));
    }

    #[test]
    fn test_skip_next_preserves_retry_count() {
        let mut def = make_definition();
        def.record_failure("posting rejected");
        def.status = DefinitionStatus::Active;
        def.skip_next();
        assert_eq!(def.next_run_date, date(2026, 4, 1));
        assert_eq!(def.retry_count, 1);
    }

    #[test]
    fn test_reject_consumes_occurrence() {
        let mut def = make_definition();
        let draft = def.template.materialize(date(2026, 3, 1));
        def.hold_for_approval(draft);

        def.reject_held();
        assert_eq!(def.status, DefinitionStatus::Active);
        assert!(def.held_draft.is_none());
        assert_eq!(def.next_run_date, date(2026, 4, 1));
        assert!(def.last_generated_entry.is_none());
    }

    #[test]
    fn test_take_held_draft() {
        let mut def = make_definition();
        def.hold_for_approval(def.template.materialize(date(2026, 3, 1)));
        assert!(def.take_held_draft().is_some());
        assert!(def.take_held_draft().is_none());
    }
}
