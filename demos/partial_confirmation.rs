//! Partial-confirmation walkthrough.
//!
//! A debtor pays in installments; each confirmation shrinks the
//! outstanding amount until the transfer is fully settled.

use rust_decimal_macros::dec;
use split_settle::core::confirmation::{Confirmation, ConfirmationLog};
use split_settle::core::expense::{Expense, ExpenseLedger, ExpenseStatus};
use split_settle::core::participant::Roster;
use split_settle::engine::SettlementEngine;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  split-settle: Partial Confirmation Example  ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let roster = Roster::from_names(["Alice", "Bob"]);
    let mut ledger = ExpenseLedger::new();
    ledger.add(
        Expense::new("Alice", ["Alice", "Bob"], dec!(600), ExpenseStatus::Approved)
            .unwrap()
            .with_description("flights"),
    );

    // Bob owes Alice 300. He pays it back in three installments.
    let mut confirmations = ConfirmationLog::new();
    let installments = [dec!(100), dec!(150), dec!(50)];

    let report = SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap();
    println!("Before any payment:");
    println!("  {}\n", report.transfers()[0]);

    for installment in installments {
        confirmations.add(Confirmation::new("Bob", "Alice", installment, "Alice"));
        let report = SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap();
        let transfer = &report.transfers()[0];
        println!("After Bob pays {}:", installment);
        println!(
            "  {}  ({:.0}% settled)\n",
            transfer,
            transfer.settled_fraction() * 100.0
        );
    }

    let report = SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap();
    println!("Group settled: {}", report.is_settled());
}
