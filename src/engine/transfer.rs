use crate::core::participant::Participant;
use crate::engine::balance::{BalanceSheet, SETTLED_EPSILON};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A proposed payment from a debtor to a creditor.
///
/// Transfers are ephemeral: they are recomputed from the balances on every
/// call and never persisted by the engine. The amount is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Participant,
    pub to: Participant,
    pub amount: Decimal,
}

impl std::fmt::Display for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {} : {}", self.from, self.to, self.amount)
    }
}

/// Compute a compact transfer plan from net balances.
///
/// Greedy largest-first matching: sort creditors and debtors descending by
/// amount (stable, so ties keep balance-sheet order), then repeatedly match
/// the largest remaining creditor with the largest remaining debtor and
/// transfer `min` of the two. A party leaves the ring once its remaining
/// amount drops below the settled epsilon.
///
/// Produces at most `creditors + debtors − 1` transfers. That is the
/// classic bound for greedy debt simplification, not the theoretical
/// minimum (which is NP-hard), but always a valid balance-zeroing plan.
/// Parties already inside the ±0.01 settled band produce nothing.
pub fn plan_transfers(balances: &BalanceSheet) -> Vec<Transfer> {
    let mut creditors = balances.creditors();
    let mut debtors = balances.debtors();

    // Stable sort keeps iteration order for equal amounts, which keeps the
    // whole plan deterministic.
    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < creditors.len() && j < debtors.len() {
        let amount = creditors[i].1.min(debtors[j].1);

        transfers.push(Transfer {
            from: debtors[j].0.clone(),
            to: creditors[i].0.clone(),
            amount,
        });

        creditors[i].1 -= amount;
        debtors[j].1 -= amount;

        if creditors[i].1 < SETTLED_EPSILON {
            i += 1;
        }
        if debtors[j].1 < SETTLED_EPSILON {
            j += 1;
        }
    }

    transfers
}
