//! Stateful ledger engine for Meridian.
//!
//! This crate drives the pure business logic in `meridian-core` against an
//! in-process store with transactional discipline:
//!
//! - `store` - In-memory tables with per-account locking
//! - `chart` - Account registration, lookup, and balance reconciliation
//! - `posting` - Atomic journal posting and reversal
//! - `billing` - Bill-wise sub-ledger tracking
//! - `scheduler` - Recurring entry generation with approval and retry
//! - `reports` - Trial balance and account ledger statements
//! - `audit` - Append-only posting audit log
//!
//! Posting is the single-writer-per-account hot path: concurrent callers
//! posting to disjoint accounts proceed in parallel, while postings that
//! share an account serialize on that account's lock. There is no global
//! posting mutex.

pub mod audit;
pub mod billing;
pub mod chart;
pub mod error;
pub mod posting;
pub mod reports;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod flow_tests;

pub use audit::AuditRecord;
pub use billing::{BillStatement, BillTracker};
pub use chart::{ChartService, NewAccount, NewGroup, NewSubGroup, ReconcileError};
pub use error::{IntegrityError, PostingError};
pub use posting::{BalanceDelta, PostingEngine, PostingReceipt};
pub use reports::TrialBalanceCalculator;
pub use scheduler::{
    BatchApprovalSummary, NewDefinition, RecurringEntryScheduler, RetryOutcome, TickSummary,
};
pub use store::LedgerStore;

use std::sync::Arc;

use meridian_shared::EngineConfig;

/// One assembled ledger engine: a shared store and every service over it.
pub struct Engine {
    /// Chart of accounts registration and lookup.
    pub chart: ChartService,
    /// Atomic posting and reversal.
    pub posting: PostingEngine,
    /// Bill-wise sub-ledger tracking.
    pub billing: BillTracker,
    /// Recurring entry scheduling.
    pub scheduler: RecurringEntryScheduler,
    /// Trial balance and statement queries.
    pub reports: TrialBalanceCalculator,
    /// The underlying store, for direct inspection.
    pub store: Arc<LedgerStore>,
}

impl Engine {
    /// Assembles an engine from configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let store = Arc::new(LedgerStore::new());
        let posting = PostingEngine::new(Arc::clone(&store));
        Self {
            chart: ChartService::new(Arc::clone(&store), config.hierarchy.clone()),
            posting: posting.clone(),
            billing: BillTracker::new(Arc::clone(&store)),
            scheduler: RecurringEntryScheduler::new(posting, config.scheduler.clone()),
            reports: TrialBalanceCalculator::new(Arc::clone(&store)),
            store,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
