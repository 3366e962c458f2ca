//! Basic balance and settlement example.
//!
//! Demonstrates how approved expenses turn into net balances and a compact
//! transfer plan.

use rust_decimal_macros::dec;
use split_settle::core::confirmation::ConfirmationLog;
use split_settle::core::expense::{Expense, ExpenseLedger, ExpenseStatus};
use split_settle::core::participant::Roster;
use split_settle::engine::SettlementEngine;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  split-settle: Basic Settlement Example  ║");
    println!("╚══════════════════════════════════════════╝\n");

    let roster = Roster::from_names(["Alice", "Bob", "Charlie"]);

    // --- Scenario 1: one shared expense ---
    println!("━━━ Scenario 1: One Shared Expense ━━━\n");

    let mut ledger = ExpenseLedger::new();
    ledger.add(
        Expense::new(
            "Alice",
            ["Alice", "Bob", "Charlie"],
            dec!(300),
            ExpenseStatus::Approved,
        )
        .unwrap()
        .with_description("cabin rental"),
    );

    let report = SettlementEngine::settle(&ledger, &roster, &ConfirmationLog::new()).unwrap();
    println!("{}", report);

    // --- Scenario 2: crossing expenses net out ---
    println!("━━━ Scenario 2: Crossing Expenses ━━━\n");

    let mut ledger = ExpenseLedger::new();
    ledger.add(
        Expense::new(
            "Alice",
            ["Alice", "Bob", "Charlie"],
            dec!(300),
            ExpenseStatus::Approved,
        )
        .unwrap()
        .with_description("groceries"),
    );
    ledger.add(
        Expense::new(
            "Bob",
            ["Alice", "Bob", "Charlie"],
            dec!(150),
            ExpenseStatus::Approved,
        )
        .unwrap()
        .with_description("fuel"),
    );
    // Still waiting on the admin: does not count yet.
    ledger.add(
        Expense::new("Charlie", ["Alice", "Charlie"], dec!(500), ExpenseStatus::Pending)
            .unwrap()
            .with_description("tickets"),
    );

    let report = SettlementEngine::settle(&ledger, &roster, &ConfirmationLog::new()).unwrap();
    println!("{}", report);

    println!("━━━ Standings ━━━\n");
    for member in roster.members() {
        let balance = report.balances().get(member);
        println!(
            "  {:<10} {:>10}  [{:?}]",
            member.to_string(),
            balance,
            report.balances().standing(member)
        );
    }
}
