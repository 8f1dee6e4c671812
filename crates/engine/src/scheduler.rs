//! Recurring entry scheduler.
//!
//! Generates journal entries from definitions on their cadence, routing
//! them through the same validation and posting path as manual entries.
//! Ticks are globally serialized: a second tick started while one is in
//! flight is refused rather than allowed to double-observe due
//! definitions. Failure handling is a bounded, recorded retry counter -
//! never a silent background loop.

use std::collections::HashMap;
use std::sync::{Mutex, TryLockError};

use chrono::NaiveDate;
use meridian_core::recurring::{
    DefinitionStatus, EntryTemplate, Frequency, RecurringDefinition, SchedulerError,
};
use meridian_shared::config::SchedulerConfig;
use meridian_shared::types::{Actor, JournalEntryId, RecurringEntryId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::posting::PostingEngine;
use crate::store::lock;

/// Input for registering a recurring definition.
#[derive(Debug, Clone)]
pub struct NewDefinition {
    /// Human-readable name.
    pub name: String,
    /// Generation cadence.
    pub frequency: Frequency,
    /// The entry shape to generate.
    pub template: EntryTemplate,
    /// First date an occurrence comes due.
    pub first_run_date: NaiveDate,
    /// Whether generated drafts require approval before posting.
    pub approval_required: bool,
    /// Retry ceiling; defaults to the configured value when absent.
    pub max_retries: Option<u32>,
}

/// What one tick did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickSummary {
    /// Definitions whose occurrence was posted, with the posted entry.
    pub posted: Vec<(RecurringEntryId, JournalEntryId)>,
    /// Definitions whose draft was held for approval.
    pub held: Vec<RecurringEntryId>,
    /// Definitions whose occurrence failed, with the failure reason.
    pub failed: Vec<(RecurringEntryId, String)>,
}

/// Outcome of retrying a failed definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RetryOutcome {
    /// The regenerated occurrence was posted.
    Posted(JournalEntryId),
    /// The regenerated draft was held for approval.
    HeldForApproval,
}

/// Per-id tally from a batch approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchApprovalSummary {
    /// Approved definitions with their posted entries.
    pub approved: Vec<(RecurringEntryId, JournalEntryId)>,
    /// Definitions whose approval failed, with the reason.
    pub failed: Vec<(RecurringEntryId, String)>,
}

/// The recurring entry scheduler.
///
/// Owns its definitions exclusively; they are mutated only by ticks and
/// the explicit admin operations below.
pub struct RecurringEntryScheduler {
    posting: PostingEngine,
    definitions: Mutex<HashMap<RecurringEntryId, RecurringDefinition>>,
    tick_lock: Mutex<()>,
    config: SchedulerConfig,
}

impl RecurringEntryScheduler {
    /// Creates a scheduler that posts through the given engine.
    #[must_use]
    pub fn new(posting: PostingEngine, config: SchedulerConfig) -> Self {
        Self {
            posting,
            definitions: Mutex::new(HashMap::new()),
            tick_lock: Mutex::new(()),
            config,
        }
    }

    /// Registers a recurring definition.
    pub fn define(&self, input: NewDefinition) -> RecurringDefinition {
        let definition = RecurringDefinition::new(
            input.name,
            input.frequency,
            input.template,
            input.first_run_date,
            input.approval_required,
            input
                .max_retries
                .unwrap_or(self.config.default_max_retries),
        );
        info!(
            definition = %definition.name,
            next_run = %definition.next_run_date,
            "recurring definition registered"
        );
        lock(&self.definitions).insert(definition.id, definition.clone());
        definition
    }

    /// Returns a copy of a definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DefinitionNotFound`] for an unknown id.
    pub fn definition(&self, id: RecurringEntryId) -> Result<RecurringDefinition, SchedulerError> {
        lock(&self.definitions)
            .get(&id)
            .cloned()
            .ok_or(SchedulerError::DefinitionNotFound(id))
    }

    /// Returns copies of all definitions.
    #[must_use]
    pub fn definitions(&self) -> Vec<RecurringDefinition> {
        lock(&self.definitions).values().cloned().collect()
    }

    /// Activates or deactivates a definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DefinitionNotFound`] for an unknown id.
    pub fn set_active(&self, id: RecurringEntryId, is_active: bool) -> Result<(), SchedulerError> {
        let mut definitions = lock(&self.definitions);
        let definition = definitions
            .get_mut(&id)
            .ok_or(SchedulerError::DefinitionNotFound(id))?;
        definition.is_active = is_active;
        Ok(())
    }

    /// Processes every definition due at `today`.
    ///
    /// Exactly one occurrence is generated per due definition per tick;
    /// long-overdue definitions catch up across successive ticks. Exactly
    /// one tick runs at a time.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TickAlreadyRunning`] if another tick
    /// holds the tick lock.
    pub fn tick(&self, today: NaiveDate, actor: &Actor) -> Result<TickSummary, SchedulerError> {
        let _tick = match self.tick_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(SchedulerError::TickAlreadyRunning),
        };

        let mut summary = TickSummary::default();
        let mut definitions = lock(&self.definitions);

        for definition in definitions.values_mut() {
            if !definition.is_due(today) {
                continue;
            }

            let draft = definition.template.materialize(today);
            if definition.approval_required {
                definition.hold_for_approval(draft);
                summary.held.push(definition.id);
                continue;
            }

            match self.posting.post(&draft, actor) {
                Ok(receipt) => {
                    definition.record_success(receipt.entry.id);
                    summary.posted.push((definition.id, receipt.entry.id));
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(
                        definition = %definition.name,
                        retry_count = definition.retry_count + 1,
                        %reason,
                        "recurring entry generation failed"
                    );
                    definition.record_failure(reason.clone());
                    summary.failed.push((definition.id, reason));
                }
            }
        }
        drop(definitions);

        info!(
            posted = summary.posted.len(),
            held = summary.held.len(),
            failed = summary.failed.len(),
            "scheduler tick complete"
        );
        Ok(summary)
    }

    /// Advances a definition's schedule one period without generating an
    /// entry. The retry counter is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DefinitionNotFound`] for an unknown id.
    pub fn skip_next(&self, id: RecurringEntryId) -> Result<NaiveDate, SchedulerError> {
        let mut definitions = lock(&self.definitions);
        let definition = definitions
            .get_mut(&id)
            .ok_or(SchedulerError::DefinitionNotFound(id))?;
        definition.skip_next();
        Ok(definition.next_run_date)
    }

    /// Re-attempts generation and posting for a failed definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NotFailed`] if the definition is not in
    /// the failed state, [`SchedulerError::RetriesExhausted`] once the
    /// retry ceiling is reached (manual intervention required), and
    /// [`SchedulerError::PostingFailed`] if the re-attempt itself fails.
    pub fn retry(
        &self,
        id: RecurringEntryId,
        today: NaiveDate,
        actor: &Actor,
    ) -> Result<RetryOutcome, SchedulerError> {
        let mut definitions = lock(&self.definitions);
        let definition = definitions
            .get_mut(&id)
            .ok_or(SchedulerError::DefinitionNotFound(id))?;

        if definition.status != DefinitionStatus::Failed {
            return Err(SchedulerError::NotFailed(id));
        }
        if !definition.can_retry() {
            return Err(SchedulerError::RetriesExhausted {
                id,
                max_retries: definition.max_retries,
            });
        }

        let draft = definition.template.materialize(today);
        if definition.approval_required {
            definition.hold_for_approval(draft);
            return Ok(RetryOutcome::HeldForApproval);
        }

        match self.posting.post(&draft, actor) {
            Ok(receipt) => {
                definition.record_success(receipt.entry.id);
                Ok(RetryOutcome::Posted(receipt.entry.id))
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(definition = %definition.name, %reason, "retry failed");
                definition.record_failure(reason.clone());
                Err(SchedulerError::PostingFailed { id, reason })
            }
        }
    }

    /// Approves a held draft: validates, posts, and advances the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NotPendingApproval`] if no draft is held,
    /// and [`SchedulerError::PostingFailed`] (moving the definition to
    /// failed) if posting is rejected.
    pub fn approve(
        &self,
        id: RecurringEntryId,
        actor: &Actor,
    ) -> Result<JournalEntryId, SchedulerError> {
        let mut definitions = lock(&self.definitions);
        let definition = definitions
            .get_mut(&id)
            .ok_or(SchedulerError::DefinitionNotFound(id))?;

        if definition.status != DefinitionStatus::PendingApproval {
            return Err(SchedulerError::NotPendingApproval(id));
        }
        let draft = definition
            .take_held_draft()
            .ok_or(SchedulerError::NotPendingApproval(id))?;

        match self.posting.post(&draft, actor) {
            Ok(receipt) => {
                definition.record_success(receipt.entry.id);
                info!(
                    definition = %definition.name,
                    entry = %receipt.entry.entry_number,
                    "held draft approved and posted"
                );
                Ok(receipt.entry.id)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(definition = %definition.name, %reason, "approval posting failed");
                definition.record_failure(reason.clone());
                Err(SchedulerError::PostingFailed { id, reason })
            }
        }
    }

    /// Rejects a held draft: discards it and advances the schedule without
    /// posting. The occurrence is consumed.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NotPendingApproval`] if no draft is held.
    pub fn reject(&self, id: RecurringEntryId) -> Result<(), SchedulerError> {
        let mut definitions = lock(&self.definitions);
        let definition = definitions
            .get_mut(&id)
            .ok_or(SchedulerError::DefinitionNotFound(id))?;

        if definition.status != DefinitionStatus::PendingApproval {
            return Err(SchedulerError::NotPendingApproval(id));
        }
        definition.reject_held();
        info!(definition = %definition.name, "held draft rejected");
        Ok(())
    }

    /// Applies [`approve`](Self::approve) to each id independently.
    ///
    /// One failure never blocks the rest; the summary tallies both sides.
    pub fn batch_approve(&self, ids: &[RecurringEntryId], actor: &Actor) -> BatchApprovalSummary {
        let mut summary = BatchApprovalSummary::default();
        for &id in ids {
            match self.approve(id, actor) {
                Ok(entry_id) => summary.approved.push((id, entry_id)),
                Err(e) => summary.failed.push((id, e.to_string())),
            }
        }
        summary
    }
}
