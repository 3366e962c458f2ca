use crate::core::confirmation::ConfirmationLog;
use crate::core::participant::Participant;
use crate::engine::balance::SETTLED_EPSILON;
use crate::engine::transfer::Transfer;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a proposed transfer, derived purely from the confirmation
/// log on every call. There is no stored state and no backward transition:
/// outstanding → partially confirmed → fully confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Outstanding,
    PartiallyConfirmed,
    FullyConfirmed,
}

/// A proposed transfer annotated with how much of it has been confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledTransfer {
    pub from: Participant,
    pub to: Participant,
    /// The proposed amount.
    pub amount: Decimal,
    /// Sum of every confirmation recorded against this pair. Can exceed
    /// `amount` when the log is inconsistent; see [`Self::over_confirmation`].
    pub recorded_amount: Decimal,
    /// Recorded amount capped at the proposal.
    pub confirmed_amount: Decimal,
    /// What is still outstanding.
    pub remaining_amount: Decimal,
    /// True once the transfer is fully confirmed.
    pub confirmed: bool,
    pub status: SettlementStatus,
}

impl ReconciledTransfer {
    fn build(transfer: &Transfer, recorded: Decimal) -> Self {
        let confirmed_amount = recorded.min(transfer.amount);
        let remaining_amount = transfer.amount - confirmed_amount;

        let status = if confirmed_amount <= Decimal::ZERO {
            SettlementStatus::Outstanding
        } else if remaining_amount < SETTLED_EPSILON {
            SettlementStatus::FullyConfirmed
        } else {
            SettlementStatus::PartiallyConfirmed
        };

        Self {
            from: transfer.from.clone(),
            to: transfer.to.clone(),
            amount: transfer.amount,
            recorded_amount: recorded,
            confirmed_amount,
            remaining_amount,
            confirmed: status == SettlementStatus::FullyConfirmed,
            status,
        }
    }

    /// Amount recorded beyond the proposal, zero when the log is consistent.
    pub fn over_confirmation(&self) -> Decimal {
        (self.recorded_amount - self.amount).max(Decimal::ZERO)
    }

    /// Fraction of the proposal confirmed, in `[0, 1]`. For display.
    pub fn settled_fraction(&self) -> f64 {
        if self.amount == Decimal::ZERO {
            return 0.0;
        }
        let fraction = self.confirmed_amount / self.amount;
        fraction.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

impl std::fmt::Display for ReconciledTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            SettlementStatus::Outstanding => {
                write!(f, "{} → {} : {} outstanding", self.from, self.to, self.amount)
            }
            SettlementStatus::PartiallyConfirmed => write!(
                f,
                "{} → {} : {} of {} confirmed, {} remaining",
                self.from, self.to, self.confirmed_amount, self.amount, self.remaining_amount
            ),
            SettlementStatus::FullyConfirmed => {
                write!(f, "{} → {} : {} settled", self.from, self.to, self.amount)
            }
        }
    }
}

/// Reconcile proposed transfers against the confirmation log.
///
/// Confirmations match transfers by `(from, to)` pair, never by amount,
/// since partial payments make the proposed and confirmed amounts diverge.
/// Multiple confirmations for the same pair sum. A sum beyond the proposed
/// amount is capped and flagged as an over-confirmation; the surplus is
/// reported, not redistributed.
///
/// This is a pure merge: no authorization checks, no mutation of the
/// expense ledger, and the whole result is recomputed on every call.
pub fn reconcile(
    transfers: &[Transfer],
    confirmations: &ConfirmationLog,
) -> Vec<ReconciledTransfer> {
    transfers
        .iter()
        .map(|transfer| {
            let recorded = confirmations.total_for(&transfer.from, &transfer.to);
            let reconciled = ReconciledTransfer::build(transfer, recorded);
            if reconciled.over_confirmation() > Decimal::ZERO {
                warn!(
                    "confirmations for {} → {} total {recorded}, beyond the proposed {}",
                    transfer.from, transfer.to, transfer.amount
                );
            }
            reconciled
        })
        .collect()
}
