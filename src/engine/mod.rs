//! The settlement pipeline: balances → transfer plan → reconciliation.

pub mod balance;
pub mod reconcile;
pub mod transfer;

pub use balance::{BALANCE_TOLERANCE, SETTLED_EPSILON};

use crate::core::confirmation::ConfirmationLog;
use crate::core::expense::{ExpenseError, ExpenseLedger};
use crate::core::participant::{Participant, Roster};
use balance::{BalanceReport, BalanceSheet};
use reconcile::{ReconciledTransfer, SettlementStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use transfer::Transfer;
use uuid::Uuid;

/// A non-fatal data-integrity finding. Computation proceeds with a
/// defensive default; anomalies are collected on the report and logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// An approved expense with an empty split was skipped entirely.
    EmptySplit { expense: Uuid },
    /// A name appeared in an expense but not on the roster. Its balance is
    /// tracked anyway so no money is dropped.
    UnknownParticipant { name: String },
    /// Confirmations for a pair sum beyond the proposed transfer.
    OverConfirmed {
        from: Participant,
        to: Participant,
        proposed: Decimal,
        recorded: Decimal,
    },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::EmptySplit { expense } => {
                write!(f, "expense {expense} has an empty split and was skipped")
            }
            Anomaly::UnknownParticipant { name } => {
                write!(f, "'{name}' is not on the roster")
            }
            Anomaly::OverConfirmed {
                from,
                to,
                proposed,
                recorded,
            } => write!(
                f,
                "{from} → {to} confirmed {recorded} against a proposed {proposed}"
            ),
        }
    }
}

/// The settlement engine.
///
/// Stateless and synchronous: every method is a pure function of its
/// arguments, recomputed from the full inputs on each call. Concurrent
/// callers may observe different ledger snapshots; ordering those is the
/// storage layer's problem, not ours.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Net balances over approved expenses. See [`balance::compute_balances`].
    pub fn compute_balances(
        ledger: &ExpenseLedger,
        roster: &Roster,
    ) -> Result<BalanceReport, ExpenseError> {
        balance::compute_balances(ledger, roster)
    }

    /// Greedy largest-first transfer plan. See [`transfer::plan_transfers`].
    pub fn plan_transfers(balances: &BalanceSheet) -> Vec<Transfer> {
        transfer::plan_transfers(balances)
    }

    /// Merge confirmations into a transfer plan. See [`reconcile::reconcile`].
    pub fn reconcile(
        transfers: &[Transfer],
        confirmations: &ConfirmationLog,
    ) -> Vec<ReconciledTransfer> {
        reconcile::reconcile(transfers, confirmations)
    }

    /// Run the full pipeline: balances, transfer plan, reconciliation.
    pub fn settle(
        ledger: &ExpenseLedger,
        roster: &Roster,
        confirmations: &ConfirmationLog,
    ) -> Result<SettlementReport, ExpenseError> {
        let (balances, mut anomalies) = Self::compute_balances(ledger, roster)?.into_parts();
        let plan = Self::plan_transfers(&balances);
        let transfers = Self::reconcile(&plan, confirmations);

        for t in &transfers {
            if t.over_confirmation() > Decimal::ZERO {
                anomalies.push(Anomaly::OverConfirmed {
                    from: t.from.clone(),
                    to: t.to.clone(),
                    proposed: t.amount,
                    recorded: t.recorded_amount,
                });
            }
        }

        Ok(SettlementReport {
            balances,
            transfers,
            anomalies,
            approved_total: ledger.approved_total(),
        })
    }
}

/// Everything a caller needs to render the settlement state of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    balances: BalanceSheet,
    transfers: Vec<ReconciledTransfer>,
    anomalies: Vec<Anomaly>,
    approved_total: Decimal,
}

impl SettlementReport {
    /// Net balance per participant.
    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    /// Proposed transfers, reconciled against confirmations.
    pub fn transfers(&self) -> &[ReconciledTransfer] {
        &self.transfers
    }

    /// Data-integrity findings from the whole pipeline.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Total value of approved expenses.
    pub fn approved_total(&self) -> Decimal {
        self.approved_total
    }

    /// Sum still outstanding across all transfers.
    pub fn outstanding_total(&self) -> Decimal {
        self.transfers.iter().map(|t| t.remaining_amount).sum()
    }

    /// Sum confirmed across all transfers (capped per transfer).
    pub fn confirmed_total(&self) -> Decimal {
        self.transfers.iter().map(|t| t.confirmed_amount).sum()
    }

    /// True when nothing remains to pay.
    pub fn is_settled(&self) -> bool {
        self.transfers
            .iter()
            .all(|t| t.status == SettlementStatus::FullyConfirmed)
    }

    /// Verify the zero-sum invariant on the underlying balances.
    pub fn is_valid(&self) -> bool {
        self.balances.is_balanced()
    }
}

impl std::fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Report ===")?;
        writeln!(f, "Approved Total:   {}", self.approved_total)?;
        writeln!(f, "Confirmed Total:  {}", self.confirmed_total())?;
        writeln!(f, "Outstanding:      {}", self.outstanding_total())?;
        writeln!(f, "Settled:          {}", self.is_settled())?;
        writeln!(f, "Valid:            {}", self.is_valid())?;

        writeln!(f, "\n--- Balances ---")?;
        for (participant, amount) in self.balances.iter() {
            writeln!(f, "  {:<20} {:>12}", participant.to_string(), amount)?;
        }

        if !self.transfers.is_empty() {
            writeln!(f, "\n--- Transfers ---")?;
            for t in &self.transfers {
                writeln!(f, "  {}", t)?;
            }
        }

        if !self.anomalies.is_empty() {
            writeln!(f, "\n--- Anomalies ---")?;
            for a in &self.anomalies {
                writeln!(f, "  {}", a)?;
            }
        }
        Ok(())
    }
}
