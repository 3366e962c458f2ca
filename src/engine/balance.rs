use crate::core::expense::{ExpenseError, ExpenseLedger};
use crate::core::participant::{Participant, Roster};
use crate::engine::Anomaly;
use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Band within which a balance counts as settled. Balances in
/// `(-0.01, +0.01)` produce no transfers.
pub const SETTLED_EPSILON: Decimal = dec!(0.01);

/// Tolerance for the zero-sum invariant check. Equal-share division can
/// leave a sub-minor-unit residue; anything larger means lost money.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.000001);

/// How a participant stands after netting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// Net creditor: paid more than their share.
    ShouldReceive,
    /// Net debtor: owes money to the group.
    ShouldPay,
    /// Within the settled band.
    SettledUp,
}

/// Signed net balance per participant.
///
/// Positive means the participant is owed money (net creditor), negative
/// means they owe (net debtor). Iteration order is stable: roster members
/// first, in registration order, then any unknown names in the order they
/// were first seen. That ordering is what makes transfer planning
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct BalanceSheet {
    order: Vec<Participant>,
    amounts: HashMap<Participant, Decimal>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance slot for a participant, registering them at zero on first
    /// sight so iteration order tracks first appearance.
    fn slot(&mut self, participant: Participant) -> &mut Decimal {
        match self.amounts.entry(participant) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(entry.key().clone());
                entry.insert(Decimal::ZERO)
            }
        }
    }

    /// Register a participant with a zero balance if not already present.
    /// Fully-settled members still appear in reports.
    pub fn ensure(&mut self, participant: Participant) {
        self.slot(participant);
    }

    /// Credit a participant (they paid on behalf of the group).
    pub fn credit(&mut self, participant: Participant, amount: Decimal) {
        *self.slot(participant) += amount;
    }

    /// Debit a participant (their share of an expense).
    pub fn debit(&mut self, participant: Participant, amount: Decimal) {
        *self.slot(participant) -= amount;
    }

    /// Net balance of a participant; zero when unknown.
    pub fn get(&self, participant: &Participant) -> Decimal {
        self.amounts.get(participant).copied().unwrap_or(Decimal::ZERO)
    }

    /// Balances in stable iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Participant, Decimal)> {
        self.order.iter().map(|p| (p, self.amounts[p]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all balances. Should be zero (within tolerance): every amount
    /// credited to a payer is offset by the shares debited.
    pub fn total(&self) -> Decimal {
        self.amounts.values().sum()
    }

    /// Verify the zero-sum invariant.
    pub fn is_balanced(&self) -> bool {
        self.total().abs() < BALANCE_TOLERANCE
    }

    /// Participants owed money, with the amount owed to them.
    pub fn creditors(&self) -> Vec<(Participant, Decimal)> {
        self.iter()
            .filter(|(_, amount)| *amount > SETTLED_EPSILON)
            .map(|(p, amount)| (p.clone(), amount))
            .collect()
    }

    /// Participants owing money, with the (positive) amount they owe.
    pub fn debtors(&self) -> Vec<(Participant, Decimal)> {
        self.iter()
            .filter(|(_, amount)| *amount < -SETTLED_EPSILON)
            .map(|(p, amount)| (p.clone(), amount.abs()))
            .collect()
    }

    /// Classify a participant's position.
    pub fn standing(&self, participant: &Participant) -> Standing {
        let balance = self.get(participant);
        if balance > SETTLED_EPSILON {
            Standing::ShouldReceive
        } else if balance < -SETTLED_EPSILON {
            Standing::ShouldPay
        } else {
            Standing::SettledUp
        }
    }
}

impl Serialize for BalanceSheet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (participant, amount) in self.iter() {
            map.serialize_entry(participant.as_str(), &amount)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BalanceSheet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = BalanceSheet;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of participant name to balance")
            }
            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut sheet = BalanceSheet::new();
                while let Some((name, amount)) = access.next_entry::<String, Decimal>()? {
                    let participant = Participant::new(&name);
                    if sheet.amounts.contains_key(&participant) {
                        return Err(de::Error::custom(format!("duplicate participant: {name}")));
                    }
                    sheet.credit(participant, amount);
                }
                Ok(sheet)
            }
        }
        deserializer.deserialize_map(V)
    }
}

/// Balances plus the data-integrity anomalies observed while computing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    balances: BalanceSheet,
    anomalies: Vec<Anomaly>,
}

impl BalanceReport {
    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn into_parts(self) -> (BalanceSheet, Vec<Anomaly>) {
        (self.balances, self.anomalies)
    }
}

/// Compute net balances over the approved expenses in the ledger.
///
/// Every roster member starts at zero. For each approved expense the payer
/// is credited the full amount and every splitter is debited an equal
/// share. Pending and rejected records never touch a balance.
///
/// Defensive defaults, per the error-handling policy:
///
/// - An approved expense with an empty split is skipped entirely and
///   flagged: no credit, no debit.
/// - Names missing from the roster are still credited/debited (money is
///   never dropped) and flagged once per distinct name.
///
/// Malformed records (non-positive amount, blank payer) abort the whole
/// computation with an error, whatever their status.
pub fn compute_balances(
    ledger: &ExpenseLedger,
    roster: &Roster,
) -> Result<BalanceReport, ExpenseError> {
    for expense in ledger.expenses() {
        expense.validate()?;
    }

    let mut balances = BalanceSheet::new();
    for member in roster.members() {
        balances.ensure(member.clone());
    }

    let mut anomalies = Vec::new();
    let mut unknown_seen: HashSet<Participant> = HashSet::new();

    let resolve = |name: &str,
                       anomalies: &mut Vec<Anomaly>,
                       unknown_seen: &mut HashSet<Participant>|
     -> Participant {
        match roster.resolve(name) {
            Some(canonical) => canonical.clone(),
            None => {
                let participant = Participant::new(name);
                if unknown_seen.insert(participant.clone()) {
                    warn!("name '{}' is not on the roster; balance tracked anyway", name);
                    anomalies.push(Anomaly::UnknownParticipant {
                        name: participant.as_str().to_string(),
                    });
                }
                participant
            }
        }
    };

    for expense in ledger.approved() {
        let share = match expense.share() {
            Some(share) => share,
            None => {
                warn!("expense {} has an empty split; skipped", expense.id());
                anomalies.push(Anomaly::EmptySplit {
                    expense: expense.id(),
                });
                continue;
            }
        };

        let payer = resolve(expense.paid_by(), &mut anomalies, &mut unknown_seen);
        balances.credit(payer, expense.amount());

        for name in expense.split_between() {
            let splitter = resolve(name, &mut anomalies, &mut unknown_seen);
            balances.debit(splitter, share);
        }
    }

    Ok(BalanceReport {
        balances,
        anomalies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expense::{Expense, ExpenseStatus};
    use rust_decimal_macros::dec;

    fn roster() -> Roster {
        Roster::from_names(["Alice", "Bob", "Charlie"])
    }

    fn approved(paid_by: &str, split: &[&str], amount: Decimal) -> Expense {
        Expense::new(
            paid_by,
            split.iter().copied(),
            amount,
            ExpenseStatus::Approved,
        )
        .unwrap()
    }

    #[test]
    fn test_three_way_scenario() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(approved("Alice", &["Alice", "Bob", "Charlie"], dec!(300)));
        ledger.add(approved("Bob", &["Alice", "Bob", "Charlie"], dec!(150)));

        let report = compute_balances(&ledger, &roster()).unwrap();
        let balances = report.balances();

        assert_eq!(balances.get(&Participant::new("Alice")), dec!(150));
        assert_eq!(balances.get(&Participant::new("Bob")), Decimal::ZERO);
        assert_eq!(balances.get(&Participant::new("Charlie")), dec!(-150));
        assert!(balances.is_balanced());
        assert!(report.anomalies().is_empty());
    }

    #[test]
    fn test_pending_and_rejected_excluded() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(
            Expense::new("Alice", ["Alice", "Bob"], dec!(100), ExpenseStatus::Pending).unwrap(),
        );
        ledger.add(
            Expense::new("Bob", ["Alice", "Bob"], dec!(80), ExpenseStatus::Rejected).unwrap(),
        );

        let report = compute_balances(&ledger, &roster()).unwrap();
        for (_, amount) in report.balances().iter() {
            assert_eq!(amount, Decimal::ZERO);
        }
    }

    #[test]
    fn test_settled_members_still_reported() {
        let ledger = ExpenseLedger::new();
        let report = compute_balances(&ledger, &roster()).unwrap();
        assert_eq!(report.balances().len(), 3);
        for (p, _) in report.balances().iter() {
            assert_eq!(report.balances().standing(p), Standing::SettledUp);
        }
    }

    #[test]
    fn test_empty_split_skipped_and_flagged() {
        let mut ledger = ExpenseLedger::new();
        let bad =
            Expense::new("Alice", Vec::<String>::new(), dec!(90), ExpenseStatus::Approved).unwrap();
        let bad_id = bad.id();
        ledger.add(bad);

        let report = compute_balances(&ledger, &roster()).unwrap();
        // No credit either: the expense is excluded entirely.
        assert_eq!(report.balances().get(&Participant::new("Alice")), Decimal::ZERO);
        assert_eq!(
            report.anomalies(),
            &[Anomaly::EmptySplit { expense: bad_id }]
        );
    }

    #[test]
    fn test_unknown_participant_tracked_and_flagged_once() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(approved("Mallory", &["Mallory", "Alice"], dec!(50)));
        ledger.add(approved("mallory", &["mallory", "Bob"], dec!(30)));

        let report = compute_balances(&ledger, &roster()).unwrap();
        // 50 - 25 + 30 - 15 = 40, case variants merged.
        assert_eq!(report.balances().get(&Participant::new("Mallory")), dec!(40));
        let unknown: Vec<_> = report
            .anomalies()
            .iter()
            .filter(|a| matches!(a, Anomaly::UnknownParticipant { .. }))
            .collect();
        assert_eq!(unknown.len(), 1);
        assert!(report.balances().is_balanced());
    }

    #[test]
    fn test_case_insensitive_names_use_roster_spelling() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(approved("ALICE", &["alice", "BOB"], dec!(100)));

        let report = compute_balances(&ledger, &roster()).unwrap();
        assert_eq!(report.balances().get(&Participant::new("Alice")), dec!(50));
        assert_eq!(report.balances().get(&Participant::new("Bob")), dec!(-50));
        assert!(report.anomalies().is_empty());

        // Display form comes from the roster, not the expense record.
        let names: Vec<&str> = report.balances().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Charlie"]);
    }

    #[test]
    fn test_malformed_record_fails_fast() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(approved("Alice", &["Alice", "Bob"], dec!(100)));
        // Bypass the constructor the way external JSON input would.
        let json = format!(
            r#"{{"id":"{}","paid_by":"Bob","split_between":["Alice","Bob"],"amount":"-1",
                "status":"approved","submitted_at":"2026-01-01T00:00:00Z",
                "date":null,"description":null}}"#,
            uuid::Uuid::new_v4()
        );
        let bad: Expense = serde_json::from_str(&json).unwrap();
        ledger.add(bad);

        let result = compute_balances(&ledger, &roster());
        assert!(matches!(
            result,
            Err(ExpenseError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn test_uneven_split_residue_within_tolerance() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(approved("Alice", &["Alice", "Bob", "Charlie"], dec!(100)));

        let report = compute_balances(&ledger, &roster()).unwrap();
        assert!(report.balances().is_balanced());
        assert!(report.balances().total().abs() < BALANCE_TOLERANCE);
    }
}
