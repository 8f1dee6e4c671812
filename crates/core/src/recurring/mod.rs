//! Recurring journal entry definitions.
//!
//! This module implements:
//! - Recurrence frequencies and their date arithmetic
//! - The definition state machine (active / pending approval / failed)
//! - Entry templates materialized into dated drafts
//! - Error types for scheduler operations

pub mod error;
pub mod frequency;
pub mod types;

pub use error::SchedulerError;
pub use frequency::Frequency;
pub use types::{DefinitionStatus, EntryTemplate, RecurringDefinition, TemplateLine};
