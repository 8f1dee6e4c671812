//! Double-entry validation rules.
//!
//! Every rule is applied independently and all violations are collected,
//! so a caller sees the full list of problems in one pass. Expected bad
//! input never produces an `Err` - the caller always receives a structured
//! [`ValidationReport`].

use std::str::FromStr;

use meridian_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{BALANCE_TOLERANCE, DraftJournalEntry};

/// A single validation failure, tied to the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field (`lines[2].account_id`).
    pub field: String,
    /// Human-readable message with the figures needed to fix the input.
    pub message: String,
}

/// The outcome of validating a draft entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no rule was violated.
    pub is_valid: bool,
    /// All collected violations, in rule order.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// What the validator needs to know about a resolved account.
#[derive(Debug, Clone, Copy)]
pub struct AccountStatus {
    /// Whether the account accepts new postings.
    pub is_active: bool,
}

/// Stateless validator for draft journal entries.
pub struct JournalValidator;

impl JournalValidator {
    /// Validates a draft entry against the double-entry rules.
    ///
    /// `resolve` looks up an account by id; `None` means the id parsed but
    /// no such account exists. A malformed id is reported as a distinct
    /// format error before resolution is ever attempted, so callers can
    /// tell a typo from a stale reference.
    pub fn validate<R>(draft: &DraftJournalEntry, resolve: R) -> ValidationReport
    where
        R: Fn(AccountId) -> Option<AccountStatus>,
    {
        let mut errors = Vec::new();

        match draft.date.as_deref() {
            None => errors.push(ValidationIssue {
                field: "date".to_string(),
                message: "Date is required".to_string(),
            }),
            Some(raw) if raw.trim().is_empty() => errors.push(ValidationIssue {
                field: "date".to_string(),
                message: "Date is required".to_string(),
            }),
            Some(_) if draft.parsed_date().is_none() => errors.push(ValidationIssue {
                field: "date".to_string(),
                message: "Invalid date format".to_string(),
            }),
            Some(_) => {}
        }

        if draft.description.trim().is_empty() {
            errors.push(ValidationIssue {
                field: "description".to_string(),
                message: "Description is required and must be a non-empty string".to_string(),
            });
        }

        if draft.lines.len() < 2 {
            errors.push(ValidationIssue {
                field: "lines".to_string(),
                message: "At least 2 lines are required for double-entry bookkeeping".to_string(),
            });
        }

        for (index, line) in draft.lines.iter().enumerate() {
            let line_number = index + 1;
            let field = |name: &str| format!("lines[{index}].{name}");

            if line.account_id.trim().is_empty() {
                errors.push(ValidationIssue {
                    field: field("account_id"),
                    message: format!("Line {line_number}: Account ID is required"),
                });
            } else {
                match AccountId::from_str(line.account_id.trim()) {
                    Err(_) => errors.push(ValidationIssue {
                        field: field("account_id"),
                        message: format!("Line {line_number}: Invalid account ID format"),
                    }),
                    Ok(account_id) => match resolve(account_id) {
                        None => errors.push(ValidationIssue {
                            field: field("account_id"),
                            message: format!("Line {line_number}: Account not found"),
                        }),
                        Some(status) if !status.is_active => errors.push(ValidationIssue {
                            field: field("account_id"),
                            message: format!("Line {line_number}: Account is inactive"),
                        }),
                        Some(_) => {}
                    },
                }
            }

            if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
                errors.push(ValidationIssue {
                    field: field("amount"),
                    message: format!("Line {line_number}: Amounts cannot be negative"),
                });
            }
            if line.debit == Decimal::ZERO && line.credit == Decimal::ZERO {
                errors.push(ValidationIssue {
                    field: field("amount"),
                    message: format!(
                        "Line {line_number}: Either debit or credit amount must be greater than zero"
                    ),
                });
            }
            if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
                errors.push(ValidationIssue {
                    field: field("amount"),
                    message: format!(
                        "Line {line_number}: A line cannot have both debit and credit amounts"
                    ),
                });
            }
        }

        let totals = draft.totals();
        if (totals.total_debit - totals.total_credit).abs() > BALANCE_TOLERANCE {
            errors.push(ValidationIssue {
                field: "lines".to_string(),
                message: format!(
                    "Journal entry is not balanced. Total debits: {:.2}, Total credits: {:.2}",
                    totals.total_debit, totals.total_credit
                ),
            });
        }

        ValidationReport::from_errors(errors)
    }
}
