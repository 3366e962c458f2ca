use crate::core::participant::Participant;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when an expense record violates the caller contract.
///
/// These are fatal: the engine refuses to compute balances from malformed
/// input rather than silently producing a wrong result.
#[derive(Debug, Error, PartialEq)]
pub enum ExpenseError {
    #[error("expense {id} has non-positive amount {amount}")]
    NonPositiveAmount { id: Uuid, amount: Decimal },
    #[error("expense {id} has no payer")]
    MissingPayer { id: Uuid },
}

/// Approval state of an expense. Only approved expenses enter balance
/// computation; pending and rejected records are equally inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn is_approved(self) -> bool {
        matches!(self, ExpenseStatus::Approved)
    }
}

/// A shared expense paid by one participant and split across several.
///
/// The payer is credited the full amount; every name in `split_between`
/// (which may include the payer) is debited an equal share. Records are
/// immutable once created; edits in the surrounding application produce
/// replacement records, and the engine recomputes from the full list.
///
/// # Examples
///
/// ```
/// use split_settle::core::expense::{Expense, ExpenseStatus};
/// use rust_decimal_macros::dec;
///
/// let expense = Expense::new(
///     "Alice",
///     ["Alice", "Bob", "Charlie"],
///     dec!(300),
///     ExpenseStatus::Approved,
/// ).unwrap();
///
/// assert_eq!(expense.amount(), dec!(300));
/// assert_eq!(expense.share(), Some(dec!(100)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier for this expense.
    id: Uuid,
    /// The participant who paid.
    paid_by: String,
    /// Names sharing the cost in equal parts.
    split_between: Vec<String>,
    /// The full amount paid. Must be positive.
    amount: Decimal,
    /// Approval state.
    status: ExpenseStatus,
    /// When the record was submitted.
    submitted_at: DateTime<Utc>,
    /// The date the expense was incurred.
    date: Option<NaiveDate>,
    /// Free-form description.
    description: Option<String>,
}

impl Expense {
    /// Create a new expense record.
    ///
    /// Fails if `amount` is not positive or `paid_by` is blank. An empty
    /// `split_between` is accepted here; the engine skips and flags such
    /// records instead of refusing them.
    pub fn new<I, S>(
        paid_by: impl Into<String>,
        split_between: I,
        amount: Decimal,
        status: ExpenseStatus,
    ) -> Result<Self, ExpenseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expense = Self {
            id: Uuid::new_v4(),
            paid_by: paid_by.into(),
            split_between: split_between.into_iter().map(Into::into).collect(),
            amount,
            status,
            submitted_at: Utc::now(),
            date: None,
            description: None,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Create an expense with a specific ID (useful for testing / determinism).
    pub fn with_id(
        id: Uuid,
        paid_by: impl Into<String>,
        split_between: Vec<String>,
        amount: Decimal,
        status: ExpenseStatus,
    ) -> Result<Self, ExpenseError> {
        let expense = Self {
            id,
            paid_by: paid_by.into(),
            split_between,
            amount,
            status,
            submitted_at: Utc::now(),
            date: None,
            description: None,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Set the expense date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Re-check the caller contract. Records deserialized from external
    /// input bypass [`Expense::new`], so the engine validates again before
    /// computing.
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if self.amount <= Decimal::ZERO {
            return Err(ExpenseError::NonPositiveAmount {
                id: self.id,
                amount: self.amount,
            });
        }
        if self.paid_by.trim().is_empty() {
            return Err(ExpenseError::MissingPayer { id: self.id });
        }
        Ok(())
    }

    /// Equal share owed by each name in `split_between`, or `None` when the
    /// split is empty.
    pub fn share(&self) -> Option<Decimal> {
        if self.split_between.is_empty() {
            None
        } else {
            Some(self.amount / Decimal::from(self.split_between.len()))
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn paid_by(&self) -> &str {
        &self.paid_by
    }

    pub fn split_between(&self) -> &[String] {
        &self.split_between
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn status(&self) -> ExpenseStatus {
        self.status
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// The full expense list for a group, in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseLedger {
    expenses: Vec<Expense>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self {
            expenses: Vec::new(),
        }
    }

    pub fn add(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Approved expenses only, the records that drive balances.
    pub fn approved(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(|e| e.status().is_approved())
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Total value of approved expenses.
    pub fn approved_total(&self) -> Decimal {
        self.approved().map(|e| e.amount()).sum()
    }

    /// Total approved amount a given name paid out (case-insensitive).
    pub fn paid_total(&self, name: &str) -> Decimal {
        let probe = Participant::new(name);
        self.approved()
            .filter(|e| Participant::new(e.paid_by()) == probe)
            .map(|e| e.amount())
            .sum()
    }

    /// Total approved share a given name owes across all splits it appears
    /// in (case-insensitive).
    pub fn share_total(&self, name: &str) -> Decimal {
        let probe = Participant::new(name);
        self.approved()
            .filter_map(|e| {
                let share = e.share()?;
                e.split_between()
                    .iter()
                    .any(|n| Participant::new(n.as_str()) == probe)
                    .then_some(share)
            })
            .sum()
    }

    /// All distinct names referenced by any record, payer or splitter,
    /// regardless of status. Useful for spotting names missing from the
    /// roster.
    pub fn referenced_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .expenses
            .iter()
            .flat_map(|e| {
                std::iter::once(e.paid_by().to_string())
                    .chain(e.split_between().iter().cloned())
            })
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        names.dedup_by_key(|n| n.to_lowercase());
        names
    }
}

impl FromIterator<Expense> for ExpenseLedger {
    fn from_iter<T: IntoIterator<Item = Expense>>(iter: T) -> Self {
        Self {
            expenses: iter.into_iter().collect(),
        }
    }
}
