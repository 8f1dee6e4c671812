//! Posting audit records.
//!
//! One immutable record is appended per posted line, capturing the balance
//! movement it caused. The audit log is append-only; nothing edits or
//! deletes a record once written.

use chrono::{DateTime, Utc};
use meridian_shared::types::{AccountId, ActorId, AuditRecordId, JournalEntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An immutable record of one balance adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier.
    pub id: AuditRecordId,
    /// The journal entry whose posting caused this adjustment.
    pub entry_id: JournalEntryId,
    /// The adjusted account.
    pub account_id: AccountId,
    /// Signed balance change applied.
    pub delta: Decimal,
    /// Account balance before the adjustment.
    pub previous_balance: Decimal,
    /// Account balance after the adjustment.
    pub new_balance: Decimal,
    /// When the adjustment was applied.
    pub timestamp: DateTime<Utc>,
    /// Who posted the entry.
    pub actor_id: ActorId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_is_internally_consistent() {
        let record = AuditRecord {
            id: AuditRecordId::new(),
            entry_id: JournalEntryId::new(),
            account_id: AccountId::new(),
            delta: dec!(50),
            previous_balance: dec!(100),
            new_balance: dec!(150),
            timestamp: Utc::now(),
            actor_id: ActorId::new(),
        };
        assert_eq!(record.previous_balance + record.delta, record.new_balance);
    }
}
