use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Body of an expense document: `{amount, description, category, date}`.
///
/// Every value of this type has a positive amount, a trimmed non-empty
/// description and a non-empty category. Decoding a stored document goes
/// through the same checks as the entry form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExpenseDoc", into = "ExpenseDoc")]
pub(crate) struct NewExpense {
    amount: Decimal,
    description: String,
    category: String,
    date: DateTime<Utc>,
}

/// Largest amount or budget accepted. Sums of many such values stay well
/// inside the `Decimal` range.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

impl NewExpense {
    pub(crate) fn checked(
        amount: Decimal,
        description: &str,
        category: &str,
        date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive);
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::TooLarge);
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(Self {
            amount,
            description: description.to_string(),
            category: category.to_string(),
            date,
        })
    }

    pub(crate) fn amount(&self) -> Decimal {
        self.amount
    }

    pub(crate) fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn category(&self) -> &str {
        &self.category
    }

    pub(crate) fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

#[derive(Serialize, Deserialize)]
struct ExpenseDoc {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    description: String,
    category: String,
    date: DateTime<Utc>,
}

impl TryFrom<ExpenseDoc> for NewExpense {
    type Error = ValidationError;

    fn try_from(doc: ExpenseDoc) -> Result<Self, Self::Error> {
        Self::checked(doc.amount, &doc.description, &doc.category, doc.date)
    }
}

impl From<NewExpense> for ExpenseDoc {
    fn from(e: NewExpense) -> Self {
        Self {
            amount: e.amount,
            description: e.description,
            category: e.category,
            date: e.date,
        }
    }
}

/// An expense read back from the `expenses` collection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expense {
    pub id: String,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

impl Expense {
    pub(crate) fn from_parts(id: String, body: NewExpense) -> Self {
        Self {
            id,
            amount: body.amount,
            description: body.description,
            category: body.category,
            date: body.date,
        }
    }
}
