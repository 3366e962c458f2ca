use crate::core::participant::Participant;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recorded acknowledgement that some or all of a proposed transfer was
/// paid.
///
/// Confirmations are appended by the surrounding application (by the
/// receiving party or an admin; authorization happens out there, not
/// here). The engine only reads them. A confirmation may cover less than
/// the proposed transfer; repeated partial payments accumulate per
/// `(from, to)` pair.
///
/// # Examples
///
/// ```
/// use split_settle::core::confirmation::Confirmation;
/// use rust_decimal_macros::dec;
///
/// let confirmation = Confirmation::new("Bob", "Alice", dec!(100), "Alice");
/// assert_eq!(confirmation.amount(), dec!(100));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    /// The debtor who paid.
    from: Participant,
    /// The creditor who was paid.
    to: Participant,
    /// The amount acknowledged. Must be positive.
    amount: Decimal,
    /// Who recorded the confirmation.
    confirmed_by: String,
    /// When it was recorded.
    confirmed_at: DateTime<Utc>,
}

impl Confirmation {
    /// Create a new confirmation.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(
        from: impl Into<Participant>,
        to: impl Into<Participant>,
        amount: Decimal,
        confirmed_by: impl Into<String>,
    ) -> Self {
        assert!(
            amount > Decimal::ZERO,
            "Confirmation amount must be positive, got {}",
            amount
        );
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            confirmed_by: confirmed_by.into(),
            confirmed_at: Utc::now(),
        }
    }

    /// Set a specific confirmation time (useful for testing / determinism).
    pub fn with_confirmed_at(mut self, at: DateTime<Utc>) -> Self {
        self.confirmed_at = at;
        self
    }

    // --- Accessors ---

    pub fn from(&self) -> &Participant {
        &self.from
    }

    pub fn to(&self) -> &Participant {
        &self.to
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn confirmed_by(&self) -> &str {
        &self.confirmed_by
    }

    pub fn confirmed_at(&self) -> DateTime<Utc> {
        self.confirmed_at
    }

    /// Whether this confirmation applies to the given debtor/creditor pair.
    /// Matching follows participant rules: case-insensitive.
    pub fn matches(&self, from: &Participant, to: &Participant) -> bool {
        &self.from == from && &self.to == to
    }
}

/// The append-only log of settlement confirmations for a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmationLog {
    confirmations: Vec<Confirmation>,
}

impl ConfirmationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, confirmation: Confirmation) {
        self.confirmations.push(confirmation);
    }

    pub fn confirmations(&self) -> &[Confirmation] {
        &self.confirmations
    }

    pub fn len(&self) -> usize {
        self.confirmations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confirmations.is_empty()
    }

    /// Total amount recorded against a debtor/creditor pair. Repeated
    /// partial payments sum; the result is not capped here.
    pub fn total_for(&self, from: &Participant, to: &Participant) -> Decimal {
        self.confirmations
            .iter()
            .filter(|c| c.matches(from, to))
            .map(|c| c.amount())
            .sum()
    }
}

impl FromIterator<Confirmation> for ConfirmationLog {
    fn from_iter<T: IntoIterator<Item = Confirmation>>(iter: T) -> Self {
        Self {
            confirmations: iter.into_iter().collect(),
        }
    }
}
