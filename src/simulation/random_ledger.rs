//! Random expense-ledger generation.
//!
//! Produces synthetic groups with realistic approval mixes to exercise the
//! settlement pipeline under load.

use crate::core::expense::{Expense, ExpenseLedger, ExpenseStatus};
use crate::core::participant::Roster;
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random expense ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Number of participants in the group.
    pub participant_count: usize,
    /// Average number of expenses per participant.
    pub avg_expenses_per_participant: usize,
    /// Minimum expense amount.
    pub min_amount: Decimal,
    /// Maximum expense amount.
    pub max_amount: Decimal,
    /// Probability that a generated expense is approved (the rest split
    /// between pending and rejected).
    pub approval_rate: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            participant_count: 10,
            avg_expenses_per_participant: 3,
            min_amount: Decimal::from(10),
            max_amount: Decimal::from(5_000),
            approval_rate: 0.8,
        }
    }
}

/// Generate a random roster and expense ledger for testing.
pub fn generate_random_ledger(config: &LedgerConfig) -> (Roster, ExpenseLedger) {
    let mut rng = rand::thread_rng();

    let roster = Roster::from_names(
        (0..config.participant_count).map(|i| format!("Participant-{:03}", i)),
    );

    let mut ledger = ExpenseLedger::new();
    let total_expenses = config.participant_count * config.avg_expenses_per_participant;

    for _ in 0..total_expenses {
        let payer_idx = rng.gen_range(0..roster.len());
        let payer = roster.members()[payer_idx].as_str().to_string();

        // Split among a random subset that always includes at least two
        // people so the expense actually moves money. Capped at eight:
        // real groups rarely split wider than a dinner table.
        let split_size = rng.gen_range(2..=roster.len().min(8).max(2));
        let mut split: Vec<String> = Vec::with_capacity(split_size);
        while split.len() < split_size {
            let idx = rng.gen_range(0..roster.len());
            let name = roster.members()[idx].as_str().to_string();
            if !split.contains(&name) {
                split.push(name);
            }
        }

        let min_f64: f64 = config.min_amount.to_string().parse().unwrap_or(10.0);
        let max_f64: f64 = config.max_amount.to_string().parse().unwrap_or(5_000.0);
        let amount_f64 = rng.gen_range(min_f64..max_f64);
        let amount = Decimal::from_f64_retain(amount_f64)
            .unwrap_or(Decimal::from(10))
            .round_dp(2);

        let status = if rng.gen_bool(config.approval_rate) {
            ExpenseStatus::Approved
        } else if rng.gen_bool(0.5) {
            ExpenseStatus::Pending
        } else {
            ExpenseStatus::Rejected
        };

        if amount > Decimal::ZERO {
            if let Ok(expense) = Expense::new(payer, split, amount, status) {
                ledger.add(expense);
            }
        }
    }

    (roster, ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirmation::ConfirmationLog;
    use crate::engine::SettlementEngine;

    #[test]
    fn test_random_ledger_generation() {
        let config = LedgerConfig {
            participant_count: 5,
            avg_expenses_per_participant: 4,
            ..Default::default()
        };

        let (roster, ledger) = generate_random_ledger(&config);
        assert_eq!(roster.len(), 5);
        assert!(!ledger.is_empty());
        assert!(ledger.len() <= 20);
    }

    #[test]
    fn test_random_ledger_settles_cleanly() {
        let config = LedgerConfig {
            participant_count: 20,
            avg_expenses_per_participant: 5,
            ..Default::default()
        };

        let (roster, ledger) = generate_random_ledger(&config);
        let report =
            SettlementEngine::settle(&ledger, &roster, &ConfirmationLog::new()).unwrap();

        assert!(report.is_valid());
        // Generated names always come from the roster.
        assert!(report
            .anomalies()
            .iter()
            .all(|a| !matches!(a, crate::engine::Anomaly::UnknownParticipant { .. })));
    }
}
