//! Ledger record primitives shared by the two tables.

use chrono::{DateTime, Utc};

use crate::{StoreError, expenses, incomes};

/// Category applied when the user does not name one.
pub const DEFAULT_CATEGORY: &str = "Прочее";

/// Selects one of the two statically-known ledger tables.
///
/// Every store operation dispatches on this enum; table identifiers are
/// never assembled from input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RecordKind {
    #[default]
    Expense,
    Income,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Name of the table backing this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Expense => "expenses",
            Self::Income => "incomes",
        }
    }
}

impl TryFrom<&str> for RecordKind {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(StoreError::UnknownKind(other.to_string())),
        }
    }
}

/// Record fields as collected from user input.
///
/// The date stays a free-text `DD.MM.YYYY` string; month filters match on
/// its substring.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecord {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub who: String,
    pub category: String,
}

/// A stored row from one of the ledger tables.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub who: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl From<expenses::Model> for Record {
    fn from(model: expenses::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            description: model.description,
            amount: model.amount,
            who: model.who,
            category: model.category,
            created_at: model.created_at,
        }
    }
}

impl From<incomes::Model> for Record {
    fn from(model: incomes::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            description: model.description,
            amount: model.amount,
            who: model.who,
            category: model.category,
            created_at: model.created_at,
        }
    }
}
