//! End-to-end flows across the engine's services: posting against the
//! chart, reversal, trial balance, bill tracking, and the recurring
//! scheduler driving the same posting path as manual entries.

use chrono::NaiveDate;
use meridian_core::chart::AccountKind;
use meridian_core::journal::{
    DraftJournalEntry, DraftJournalLine, EntryStatus, JournalValidator,
};
use meridian_core::recurring::{DefinitionStatus, EntryTemplate, Frequency, TemplateLine};
use meridian_shared::EngineConfig;
use meridian_shared::types::{AccountId, Actor};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::Engine;
use crate::chart::NewAccount;
use crate::scheduler::NewDefinition;

fn harness() -> Engine {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    Engine::new(&EngineConfig::default())
}

fn account(h: &Engine, code: &str, kind: AccountKind) -> AccountId {
    h.chart
        .create_account(NewAccount {
            code: code.to_string(),
            name: code.to_string(),
            kind,
            normal_side: None,
            parent: None,
            opening_balance: Decimal::ZERO,
        })
        .unwrap()
        .id
}

fn draft(debit: AccountId, credit: AccountId, amount: Decimal, date: &str) -> DraftJournalEntry {
    DraftJournalEntry {
        date: Some(date.to_string()),
        description: "Flow test entry".to_string(),
        lines: vec![
            DraftJournalLine {
                account_id: debit.to_string(),
                debit: amount,
                credit: dec!(0),
                description: None,
            },
            DraftJournalLine {
                account_id: credit.to_string(),
                debit: dec!(0),
                credit: amount,
                description: None,
            },
        ],
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn posting_moves_both_normal_sides_up() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let sales = account(&h, "4000", AccountKind::Revenue);

    let candidate = draft(cash, sales, dec!(100), "2026-01-15");
    let report = JournalValidator::validate(&candidate, |id| {
        h.chart
            .resolve(id)
            .ok()
            .map(|a| meridian_core::journal::AccountStatus {
                is_active: a.is_active,
            })
    });
    assert!(report.is_valid);

    h.posting.post(&candidate, &Actor::new("bookkeeper")).unwrap();

    // Debit-normal cash rises by 100, credit-normal sales rises by 100.
    assert_eq!(h.chart.resolve(cash).unwrap().current_balance, dec!(100));
    assert_eq!(h.chart.resolve(sales).unwrap().current_balance, dec!(100));
}

#[test]
fn unbalanced_entry_never_posts() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let sales = account(&h, "4000", AccountKind::Revenue);

    let mut candidate = draft(cash, sales, dec!(100), "2026-01-15");
    candidate.lines[1].credit = dec!(90);

    let report = JournalValidator::validate(&candidate, |_| {
        Some(meridian_core::journal::AccountStatus { is_active: true })
    });
    assert!(!report.is_valid);
    let message = &report
        .errors
        .iter()
        .find(|e| e.message.contains("not balanced"))
        .unwrap()
        .message;
    assert!(message.contains("100.00") && message.contains("90.00"));

    assert!(h.posting.post(&candidate, &Actor::new("bookkeeper")).is_err());
    assert_eq!(h.chart.resolve(cash).unwrap().current_balance, dec!(0));
}

#[test]
fn reversal_is_involutive() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let sales = account(&h, "4000", AccountKind::Revenue);
    let actor = Actor::new("bookkeeper");

    let receipt = h
        .posting
        .post(&draft(cash, sales, dec!(250), "2026-01-15"), &actor)
        .unwrap();
    let reversal = h.posting.reverse(receipt.entry.id, &actor).unwrap();

    // Net effect of {entry, reversal} on every touched account is zero.
    assert_eq!(h.chart.resolve(cash).unwrap().current_balance, dec!(0));
    assert_eq!(h.chart.resolve(sales).unwrap().current_balance, dec!(0));

    assert_eq!(reversal.entry.reversal_of, Some(receipt.entry.id));
    let original = h.reports.account_ledger(cash, None, None).unwrap();
    assert_eq!(original.lines.len(), 2);
    assert_eq!(original.closing_balance, dec!(0));
}

#[test]
fn reversed_entry_status_and_links() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let sales = account(&h, "4000", AccountKind::Revenue);
    let actor = Actor::new("bookkeeper");

    let receipt = h
        .posting
        .post(&draft(cash, sales, dec!(75), "2026-01-15"), &actor)
        .unwrap();
    let reversal = h.posting.reverse(receipt.entry.id, &actor).unwrap();

    // The reversal is dated on the day it posts, so look far ahead.
    let trial = h.reports.check(date(2099, 12, 31)).unwrap();
    assert!(trial.totals.is_balanced);
    // Both the original and its reversal contribute posted lines.
    assert_eq!(trial.totals.total_debit, dec!(150));
    assert_eq!(trial.totals.total_credit, dec!(150));
    assert_eq!(reversal.entry.status, EntryStatus::Posted);
}

#[test]
fn trial_balance_as_of_filters_by_date() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let sales = account(&h, "4000", AccountKind::Revenue);
    let actor = Actor::new("bookkeeper");

    h.posting
        .post(&draft(cash, sales, dec!(100), "2026-01-15"), &actor)
        .unwrap();
    h.posting
        .post(&draft(cash, sales, dec!(50), "2026-03-15"), &actor)
        .unwrap();

    let january = h.reports.trial_balance(date(2026, 1, 31));
    assert_eq!(january.totals.total_debit, dec!(100));

    let march = h.reports.trial_balance(date(2026, 3, 31));
    assert_eq!(march.totals.total_debit, dec!(150));
    assert!(january.totals.is_balanced && march.totals.is_balanced);
}

#[test]
fn recomputed_balance_matches_incremental() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let sales = account(&h, "4000", AccountKind::Revenue);
    let expense = account(&h, "5000", AccountKind::Expense);
    let actor = Actor::new("bookkeeper");

    h.posting
        .post(&draft(cash, sales, dec!(100), "2026-01-10"), &actor)
        .unwrap();
    h.posting
        .post(&draft(expense, cash, dec!(40), "2026-01-12"), &actor)
        .unwrap();
    h.posting
        .post(&draft(cash, sales, dec!(25.50), "2026-01-20"), &actor)
        .unwrap();

    for id in [cash, sales, expense] {
        let incremental = h.chart.resolve(id).unwrap().current_balance;
        let recomputed = h.chart.compute_balance(id, date(2026, 12, 31)).unwrap();
        assert_eq!(incremental, recomputed);
        assert!(h.chart.reconcile(id).is_ok());
    }
    assert_eq!(h.chart.resolve(cash).unwrap().current_balance, dec!(85.50));
}

#[test]
fn account_ledger_running_balance_with_range() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let sales = account(&h, "4000", AccountKind::Revenue);
    let actor = Actor::new("bookkeeper");

    h.posting
        .post(&draft(cash, sales, dec!(100), "2026-01-10"), &actor)
        .unwrap();
    h.posting
        .post(&draft(cash, sales, dec!(50), "2026-02-10"), &actor)
        .unwrap();

    // January movement folds into the opening balance of a February view.
    let statement = h
        .reports
        .account_ledger(cash, Some(date(2026, 2, 1)), None)
        .unwrap();
    assert_eq!(statement.opening_balance, dec!(100));
    assert_eq!(statement.lines.len(), 1);
    assert_eq!(statement.closing_balance, dec!(150));
}

#[test]
fn scheduler_posts_through_the_same_path() {
    let h = harness();
    let rent = account(&h, "5100", AccountKind::Expense);
    let bank = account(&h, "1100", AccountKind::Asset);

    let definition = h.scheduler.define(NewDefinition {
        name: "Monthly rent".to_string(),
        frequency: Frequency::Monthly,
        template: EntryTemplate {
            description: "Monthly rent".to_string(),
            lines: vec![
                TemplateLine {
                    account_id: rent,
                    debit: dec!(1200),
                    credit: dec!(0),
                    description: None,
                },
                TemplateLine {
                    account_id: bank,
                    debit: dec!(0),
                    credit: dec!(1200),
                    description: None,
                },
            ],
        },
        first_run_date: date(2026, 3, 1),
        approval_required: false,
        max_retries: None,
    });

    let summary = h.scheduler.tick(date(2026, 3, 1), &Actor::scheduler()).unwrap();
    assert_eq!(summary.posted.len(), 1);
    assert!(summary.held.is_empty() && summary.failed.is_empty());

    assert_eq!(h.chart.resolve(rent).unwrap().current_balance, dec!(1200));
    let updated = h.scheduler.definition(definition.id).unwrap();
    assert_eq!(updated.next_run_date, date(2026, 4, 1));
    assert!(updated.last_generated_entry.is_some());

    // The same occurrence is never posted twice.
    let summary = h.scheduler.tick(date(2026, 3, 1), &Actor::scheduler()).unwrap();
    assert!(summary.posted.is_empty());
    assert_eq!(h.chart.resolve(rent).unwrap().current_balance, dec!(1200));
}

#[test]
fn approval_required_definition_holds_then_posts() {
    let h = harness();
    let rent = account(&h, "5100", AccountKind::Expense);
    let bank = account(&h, "1100", AccountKind::Asset);

    let definition = h.scheduler.define(NewDefinition {
        name: "Quarterly audit fee".to_string(),
        frequency: Frequency::Quarterly,
        template: EntryTemplate {
            description: "Audit fee accrual".to_string(),
            lines: vec![
                TemplateLine {
                    account_id: rent,
                    debit: dec!(900),
                    credit: dec!(0),
                    description: None,
                },
                TemplateLine {
                    account_id: bank,
                    debit: dec!(0),
                    credit: dec!(900),
                    description: None,
                },
            ],
        },
        first_run_date: date(2026, 3, 31),
        approval_required: true,
        max_retries: None,
    });

    let summary = h.scheduler.tick(date(2026, 3, 31), &Actor::scheduler()).unwrap();
    assert_eq!(summary.held, vec![definition.id]);
    // No posting happened while the draft is held.
    assert_eq!(h.chart.resolve(rent).unwrap().current_balance, dec!(0));
    assert_eq!(
        h.scheduler.definition(definition.id).unwrap().status,
        DefinitionStatus::PendingApproval
    );

    let entry_id = h.scheduler.approve(definition.id, &Actor::new("controller")).unwrap();
    assert_eq!(h.chart.resolve(rent).unwrap().current_balance, dec!(900));

    let updated = h.scheduler.definition(definition.id).unwrap();
    assert_eq!(updated.status, DefinitionStatus::Active);
    assert_eq!(updated.next_run_date, date(2026, 6, 30));
    assert_eq!(updated.last_generated_entry, Some(entry_id));
}

#[test]
fn failed_generation_is_bounded_by_retry_ceiling() {
    let h = harness();
    let bank = account(&h, "1100", AccountKind::Asset);

    // The template references an account that was never registered, so
    // every generation attempt is rejected by validation.
    let definition = h.scheduler.define(NewDefinition {
        name: "Broken accrual".to_string(),
        frequency: Frequency::Monthly,
        template: EntryTemplate {
            description: "Accrual".to_string(),
            lines: vec![
                TemplateLine {
                    account_id: AccountId::new(),
                    debit: dec!(100),
                    credit: dec!(0),
                    description: None,
                },
                TemplateLine {
                    account_id: bank,
                    debit: dec!(0),
                    credit: dec!(100),
                    description: None,
                },
            ],
        },
        first_run_date: date(2026, 3, 1),
        approval_required: false,
        max_retries: Some(3),
    });
    let actor = Actor::scheduler();

    let summary = h.scheduler.tick(date(2026, 3, 1), &actor).unwrap();
    assert_eq!(summary.failed.len(), 1);

    let failed = h.scheduler.definition(definition.id).unwrap();
    assert_eq!(failed.status, DefinitionStatus::Failed);
    assert_eq!(failed.retry_count, 1);
    assert!(failed.failure_reason.is_some());
    // The schedule did not advance past the failed occurrence.
    assert_eq!(failed.next_run_date, date(2026, 3, 1));

    // Two more explicit retries fail and count up.
    for expected in 2..=3u32 {
        let result = h.scheduler.retry(definition.id, date(2026, 3, 2), &actor);
        assert!(matches!(
            result,
            Err(meridian_core::recurring::SchedulerError::PostingFailed { .. })
        ));
        assert_eq!(
            h.scheduler.definition(definition.id).unwrap().retry_count,
            expected
        );
    }

    // The ceiling is reached: no silent infinite retry.
    let result = h.scheduler.retry(definition.id, date(2026, 3, 3), &actor);
    assert!(matches!(
        result,
        Err(meridian_core::recurring::SchedulerError::RetriesExhausted { max_retries: 3, .. })
    ));
    assert_eq!(h.chart.resolve(bank).unwrap().current_balance, dec!(0));
}

#[test]
fn skip_next_advances_without_generating() {
    let h = harness();
    let rent = account(&h, "5100", AccountKind::Expense);
    let bank = account(&h, "1100", AccountKind::Asset);

    let definition = h.scheduler.define(NewDefinition {
        name: "Weekly sweep".to_string(),
        frequency: Frequency::Weekly,
        template: EntryTemplate {
            description: "Sweep".to_string(),
            lines: vec![
                TemplateLine {
                    account_id: rent,
                    debit: dec!(10),
                    credit: dec!(0),
                    description: None,
                },
                TemplateLine {
                    account_id: bank,
                    debit: dec!(0),
                    credit: dec!(10),
                    description: None,
                },
            ],
        },
        first_run_date: date(2026, 3, 2),
        approval_required: false,
        max_retries: None,
    });

    let next = h.scheduler.skip_next(definition.id).unwrap();
    assert_eq!(next, date(2026, 3, 9));

    // The skipped occurrence generates nothing on its original date.
    let summary = h.scheduler.tick(date(2026, 3, 2), &Actor::scheduler()).unwrap();
    assert!(summary.posted.is_empty());
    assert_eq!(h.chart.resolve(rent).unwrap().current_balance, dec!(0));
}

#[test]
fn reject_discards_draft_and_advances() {
    let h = harness();
    let rent = account(&h, "5100", AccountKind::Expense);
    let bank = account(&h, "1100", AccountKind::Asset);

    let definition = h.scheduler.define(NewDefinition {
        name: "Monthly accrual".to_string(),
        frequency: Frequency::Monthly,
        template: EntryTemplate {
            description: "Accrual".to_string(),
            lines: vec![
                TemplateLine {
                    account_id: rent,
                    debit: dec!(100),
                    credit: dec!(0),
                    description: None,
                },
                TemplateLine {
                    account_id: bank,
                    debit: dec!(0),
                    credit: dec!(100),
                    description: None,
                },
            ],
        },
        first_run_date: date(2026, 3, 1),
        approval_required: true,
        max_retries: None,
    });

    h.scheduler.tick(date(2026, 3, 1), &Actor::scheduler()).unwrap();
    h.scheduler.reject(definition.id).unwrap();

    let updated = h.scheduler.definition(definition.id).unwrap();
    assert_eq!(updated.status, DefinitionStatus::Active);
    assert_eq!(updated.next_run_date, date(2026, 4, 1));
    assert!(updated.last_generated_entry.is_none());
    assert_eq!(h.chart.resolve(rent).unwrap().current_balance, dec!(0));
}

#[test]
fn batch_approve_tallies_independent_outcomes() {
    let h = harness();
    let rent = account(&h, "5100", AccountKind::Expense);
    let bank = account(&h, "1100", AccountKind::Asset);

    let make_definition = |name: &str| {
        h.scheduler.define(NewDefinition {
            name: name.to_string(),
            frequency: Frequency::Monthly,
            template: EntryTemplate {
                description: name.to_string(),
                lines: vec![
                    TemplateLine {
                        account_id: rent,
                        debit: dec!(100),
                        credit: dec!(0),
                        description: None,
                    },
                    TemplateLine {
                        account_id: bank,
                        debit: dec!(0),
                        credit: dec!(100),
                        description: None,
                    },
                ],
            },
            first_run_date: date(2026, 3, 1),
            approval_required: true,
            max_retries: None,
        })
    };
    let first = make_definition("First accrual");
    let second = make_definition("Second accrual");

    h.scheduler.tick(date(2026, 3, 1), &Actor::scheduler()).unwrap();

    // One id in the batch was never held for approval.
    let stranger = meridian_shared::types::RecurringEntryId::new();
    let summary = h.scheduler.batch_approve(
        &[first.id, stranger, second.id],
        &Actor::new("controller"),
    );

    assert_eq!(summary.approved.len(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, stranger);
    // The failure in the middle did not block the second approval.
    assert_eq!(h.chart.resolve(rent).unwrap().current_balance, dec!(200));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any sequence of balanced postings leaves the trial balance balanced
    /// and every incremental balance equal to its recomputation.
    #[test]
    fn prop_posted_ledger_always_balances(
        amounts in proptest::collection::vec(1i64..1_000_000i64, 1..12),
    ) {
        let h = harness();
        let cash = account(&h, "1000", AccountKind::Asset);
        let sales = account(&h, "4000", AccountKind::Revenue);
        let actor = Actor::new("prop");

        for cents in amounts {
            h.posting
                .post(&draft(cash, sales, Decimal::new(cents, 2), "2026-01-15"), &actor)
                .unwrap();
        }

        let report = h.reports.trial_balance(date(2026, 12, 31));
        prop_assert!(report.totals.is_balanced);
        prop_assert!(h.chart.reconcile(cash).is_ok());
        prop_assert!(h.chart.reconcile(sales).is_ok());
    }
}

#[test]
fn bill_settled_by_posted_payments() {
    let h = harness();
    let cash = account(&h, "1000", AccountKind::Asset);
    let receivable = account(&h, "1200", AccountKind::Asset);
    let actor = Actor::new("bookkeeper");

    let bill = h
        .billing
        .create_bill(
            receivable,
            "INV-2026-17",
            dec!(500),
            date(2026, 1, 1),
            date(2026, 1, 31),
        )
        .unwrap();

    let receipt = h
        .posting
        .post(&draft(cash, receivable, dec!(500), "2026-01-20"), &actor)
        .unwrap();
    let settled = h
        .billing
        .record_payment(bill.id, dec!(500), date(2026, 1, 20), receipt.entry.id)
        .unwrap();

    assert_eq!(settled.balance_amount, dec!(0));
    assert_eq!(settled.payments[0].journal_entry_id, receipt.entry.id);

    let statement = h.billing.statement(receivable).unwrap();
    assert_eq!(statement.summary.total_balance, dec!(0));
}
