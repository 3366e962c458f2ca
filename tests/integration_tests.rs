use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use split_settle::core::confirmation::{Confirmation, ConfirmationLog};
use split_settle::core::expense::{Expense, ExpenseLedger, ExpenseStatus};
use split_settle::core::participant::{Participant, Roster};
use split_settle::engine::balance::Standing;
use split_settle::engine::reconcile::SettlementStatus;
use split_settle::engine::SettlementEngine;

fn expense(paid_by: &str, split: &[&str], amount: Decimal, status: ExpenseStatus) -> Expense {
    Expense::new(paid_by, split.iter().copied(), amount, status).unwrap()
}

/// Full pipeline test: expenses → balances → transfers → reconciliation.
#[test]
fn full_pipeline_trip_scenario() {
    let roster = Roster::from_names(["Alice", "Bob", "Charlie", "Dana", "Erin"]);
    let mut ledger = ExpenseLedger::new();

    ledger.add(expense(
        "Alice",
        &["Alice", "Bob", "Charlie", "Dana", "Erin"],
        dec!(500),
        ExpenseStatus::Approved,
    ));
    ledger.add(expense(
        "Bob",
        &["Alice", "Bob", "Charlie"],
        dec!(90),
        ExpenseStatus::Approved,
    ));
    ledger.add(expense(
        "Charlie",
        &["Charlie", "Dana", "Erin"],
        dec!(60),
        ExpenseStatus::Approved,
    ));
    // Not approved yet: must not move any balance.
    ledger.add(expense(
        "Dana",
        &["Alice", "Dana"],
        dec!(400),
        ExpenseStatus::Pending,
    ));
    ledger.add(expense(
        "Erin",
        &["Bob", "Erin"],
        dec!(250),
        ExpenseStatus::Rejected,
    ));

    let mut confirmations = ConfirmationLog::new();
    confirmations.add(Confirmation::new("Dana", "Alice", dec!(50), "Alice"));

    let report = SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap();

    assert!(report.is_valid());
    assert_eq!(report.approved_total(), dec!(650));
    assert!(report.anomalies().is_empty());

    // Alice: +500 - 100 - 30 = +370
    let balances = report.balances();
    assert_eq!(balances.get(&Participant::new("Alice")), dec!(370));
    // Bob: +90 - 100 - 30 = -40
    assert_eq!(balances.get(&Participant::new("Bob")), dec!(-40));
    // Charlie: +60 - 100 - 30 - 20 = -90
    assert_eq!(balances.get(&Participant::new("Charlie")), dec!(-90));
    // Dana and Erin: -100 - 20 = -120 each
    assert_eq!(balances.get(&Participant::new("Dana")), dec!(-120));
    assert_eq!(balances.get(&Participant::new("Erin")), dec!(-120));

    // Everyone's transfers drain into Alice, the only creditor.
    assert!(report.transfers().iter().all(|t| t.to.as_str() == "Alice"));
    assert_eq!(report.transfers().len(), 4);

    // Dana's 120 is partially confirmed.
    let dana = report
        .transfers()
        .iter()
        .find(|t| t.from.as_str() == "Dana")
        .unwrap();
    assert_eq!(dana.amount, dec!(120));
    assert_eq!(dana.confirmed_amount, dec!(50));
    assert_eq!(dana.remaining_amount, dec!(70));
    assert_eq!(dana.status, SettlementStatus::PartiallyConfirmed);

    assert_eq!(report.outstanding_total(), dec!(320));
    assert!(!report.is_settled());
}

/// The worked scenario from the product requirements: two approved
/// expenses, one transfer closes the group.
#[test]
fn three_participant_scenario() {
    let roster = Roster::from_names(["Alice", "Bob", "Charlie"]);
    let mut ledger = ExpenseLedger::new();
    ledger.add(expense(
        "Alice",
        &["Alice", "Bob", "Charlie"],
        dec!(300),
        ExpenseStatus::Approved,
    ));
    ledger.add(expense(
        "Bob",
        &["Alice", "Bob", "Charlie"],
        dec!(150),
        ExpenseStatus::Approved,
    ));

    let report =
        SettlementEngine::settle(&ledger, &roster, &ConfirmationLog::new()).unwrap();

    let balances = report.balances();
    assert_eq!(balances.get(&Participant::new("Alice")), dec!(150));
    assert_eq!(balances.get(&Participant::new("Bob")), Decimal::ZERO);
    assert_eq!(balances.get(&Participant::new("Charlie")), dec!(-150));
    assert_eq!(balances.standing(&Participant::new("Alice")), Standing::ShouldReceive);
    assert_eq!(balances.standing(&Participant::new("Bob")), Standing::SettledUp);
    assert_eq!(balances.standing(&Participant::new("Charlie")), Standing::ShouldPay);

    assert_eq!(report.transfers().len(), 1);
    let t = &report.transfers()[0];
    assert_eq!(t.from.as_str(), "Charlie");
    assert_eq!(t.to.as_str(), "Alice");
    assert_eq!(t.amount, dec!(150));
}

/// Toggling an expense between pending and approved is the only thing
/// that changes the result.
#[test]
fn approval_toggle_changes_result() {
    let roster = Roster::from_names(["Alice", "Bob"]);

    let build = |status: ExpenseStatus| {
        let mut ledger = ExpenseLedger::new();
        ledger.add(expense("Alice", &["Alice", "Bob"], dec!(100), status));
        SettlementEngine::settle(&ledger, &roster, &ConfirmationLog::new()).unwrap()
    };

    let pending = build(ExpenseStatus::Pending);
    assert!(pending.transfers().is_empty());
    assert_eq!(pending.balances().get(&Participant::new("Bob")), Decimal::ZERO);

    let approved = build(ExpenseStatus::Approved);
    assert_eq!(approved.transfers().len(), 1);
    assert_eq!(approved.balances().get(&Participant::new("Bob")), dec!(-50));

    let rejected = build(ExpenseStatus::Rejected);
    assert!(rejected.transfers().is_empty());
}

/// Names from expenses and confirmations resolve case-insensitively to the
/// roster's canonical spelling, end to end.
#[test]
fn case_insensitive_names_end_to_end() {
    let roster = Roster::from_names(["Alice", "Bob"]);
    let mut ledger = ExpenseLedger::new();
    ledger.add(expense("ALICE", &["alice", "BOB"], dec!(80), ExpenseStatus::Approved));

    let mut confirmations = ConfirmationLog::new();
    confirmations.add(Confirmation::new("bob", "ALICE", dec!(40), "alice"));

    let report = SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap();

    assert!(report.anomalies().is_empty());
    let t = &report.transfers()[0];
    assert_eq!(t.from.as_str(), "Bob");
    assert_eq!(t.to.as_str(), "Alice");
    assert_eq!(t.amount, dec!(40));
    assert!(t.confirmed);
    assert!(report.is_settled());
}

/// A settlement report survives a JSON round-trip with its shape intact.
#[test]
fn report_json_round_trip() {
    let roster = Roster::from_names(["Alice", "Bob", "Charlie"]);
    let mut ledger = ExpenseLedger::new();
    ledger.add(expense(
        "Alice",
        &["Alice", "Bob", "Charlie"],
        dec!(300),
        ExpenseStatus::Approved,
    ));

    let mut confirmations = ConfirmationLog::new();
    confirmations.add(Confirmation::new("Bob", "Alice", dec!(25), "Alice"));

    let report = SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["balances"]["Alice"], "200");
    let transfers = parsed["transfers"].as_array().unwrap();
    assert_eq!(transfers.len(), 2);
    for t in transfers {
        assert!(t.get("from").is_some());
        assert!(t.get("to").is_some());
        assert!(t.get("amount").is_some());
        assert!(t.get("confirmed").is_some());
        assert!(t.get("remaining_amount").is_some());
    }
}

/// Expense records survive a JSON round-trip.
#[test]
fn expense_json_round_trip() {
    let e = expense("Alice", &["Alice", "Bob"], dec!(120.50), ExpenseStatus::Approved)
        .with_description("groceries");

    let json = serde_json::to_string(&e).unwrap();
    let back: Expense = serde_json::from_str(&json).unwrap();

    assert_eq!(back.id(), e.id());
    assert_eq!(back.amount(), dec!(120.50));
    assert_eq!(back.paid_by(), "Alice");
    assert_eq!(back.description(), Some("groceries"));
    assert_eq!(back.status(), ExpenseStatus::Approved);
}

/// An empty group produces a valid, settled, empty report.
#[test]
fn empty_group_settles_trivially() {
    let report = SettlementEngine::settle(
        &ExpenseLedger::new(),
        &Roster::new(),
        &ConfirmationLog::new(),
    )
    .unwrap();

    assert!(report.is_valid());
    assert!(report.is_settled());
    assert!(report.transfers().is_empty());
    assert!(report.balances().is_empty());
    assert_eq!(report.approved_total(), Decimal::ZERO);
}

/// Confirmations never mutate balances: the ledger stays the source of
/// truth and reconciliation is an overlay.
#[test]
fn confirmations_do_not_change_balances() {
    let roster = Roster::from_names(["Alice", "Bob"]);
    let mut ledger = ExpenseLedger::new();
    ledger.add(expense("Alice", &["Alice", "Bob"], dec!(100), ExpenseStatus::Approved));

    let without =
        SettlementEngine::settle(&ledger, &roster, &ConfirmationLog::new()).unwrap();

    let mut confirmations = ConfirmationLog::new();
    confirmations.add(Confirmation::new("Bob", "Alice", dec!(50), "Alice"));
    let with = SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap();

    for (participant, amount) in without.balances().iter() {
        assert_eq!(with.balances().get(participant), amount);
    }
    assert_eq!(with.transfers()[0].amount, without.transfers()[0].amount);
    assert!(with.transfers()[0].confirmed);
    assert!(!without.transfers()[0].confirmed);
}
