//! # split-settle
//!
//! Group-expense settlement and debt netting engine.
//!
//! Given a ledger of shared expenses (with approval status), the
//! authoritative participant roster, and a log of settlement confirmations,
//! this engine computes per-participant net balances and a compact set of
//! pairwise transfers that settles them, then reconciles those transfers
//! against the confirmations recorded so far.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants, expenses, confirmations
//! - **engine** — Balance computation, greedy transfer matching, reconciliation
//! - **simulation** — Random ledger generation for stress testing
//!
//! The engine is a pure function of its inputs: it holds no durable state
//! and recomputes everything from the full expense list on every call.

pub mod core;
pub mod engine;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::confirmation::{Confirmation, ConfirmationLog};
    pub use crate::core::expense::{Expense, ExpenseError, ExpenseLedger, ExpenseStatus};
    pub use crate::core::participant::{Participant, Roster};
    pub use crate::engine::balance::{BalanceReport, BalanceSheet};
    pub use crate::engine::reconcile::{ReconciledTransfer, SettlementStatus};
    pub use crate::engine::transfer::Transfer;
    pub use crate::engine::{SettlementEngine, SettlementReport};
}
