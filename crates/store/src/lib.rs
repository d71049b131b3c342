//! Record store for the two ledger tables.
//!
//! Expenses and incomes live in separate tables with identical columns.
//! Every operation picks its table through [`RecordKind`]; no statement is
//! ever assembled from user-controlled identifiers. Each statement commits
//! independently (no cross-table transactions).

use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

pub use amount::{
    AmountError, format_amount, format_amount_or_zero, parse_amount, parse_positive_amount,
};
pub use error::StoreError;
pub use record::{DEFAULT_CATEGORY, NewRecord, Record, RecordKind};
pub use stats::GroupTotal;

mod amount;
mod error;
mod expenses;
mod incomes;
mod record;
pub mod retention;
mod stats;

type ResultStore<T> = Result<T, StoreError>;

#[derive(Clone, Debug)]
pub struct Store {
    database: DatabaseConnection,
}

impl Store {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub(crate) fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Inserts a record, returning its new row id.
    ///
    /// `created_at` is filled in by the database.
    pub async fn insert(&self, kind: RecordKind, record: NewRecord) -> ResultStore<i64> {
        validate_amount(record.amount)?;

        let id = match kind {
            RecordKind::Expense => {
                let model = expenses::ActiveModel {
                    date: ActiveValue::Set(record.date),
                    description: ActiveValue::Set(record.description),
                    amount: ActiveValue::Set(record.amount),
                    who: ActiveValue::Set(record.who),
                    category: ActiveValue::Set(record.category),
                    ..Default::default()
                };
                expenses::Entity::insert(model)
                    .exec(&self.database)
                    .await?
                    .last_insert_id
            }
            RecordKind::Income => {
                let model = incomes::ActiveModel {
                    date: ActiveValue::Set(record.date),
                    description: ActiveValue::Set(record.description),
                    amount: ActiveValue::Set(record.amount),
                    who: ActiveValue::Set(record.who),
                    category: ActiveValue::Set(record.category),
                    ..Default::default()
                };
                incomes::Entity::insert(model)
                    .exec(&self.database)
                    .await?
                    .last_insert_id
            }
        };

        Ok(id)
    }

    /// Replaces the user-entered fields of a record.
    ///
    /// `id` and `created_at` are never touched. Returns the number of rows
    /// affected; a missing id yields 0, not an error.
    pub async fn update_by_id(
        &self,
        kind: RecordKind,
        id: i64,
        record: NewRecord,
    ) -> ResultStore<u64> {
        validate_amount(record.amount)?;

        let rows = match kind {
            RecordKind::Expense => {
                expenses::Entity::update_many()
                    .col_expr(expenses::Column::Date, Expr::value(record.date))
                    .col_expr(expenses::Column::Description, Expr::value(record.description))
                    .col_expr(expenses::Column::Amount, Expr::value(record.amount))
                    .col_expr(expenses::Column::Who, Expr::value(record.who))
                    .col_expr(expenses::Column::Category, Expr::value(record.category))
                    .filter(expenses::Column::Id.eq(id))
                    .exec(&self.database)
                    .await?
                    .rows_affected
            }
            RecordKind::Income => {
                incomes::Entity::update_many()
                    .col_expr(incomes::Column::Date, Expr::value(record.date))
                    .col_expr(incomes::Column::Description, Expr::value(record.description))
                    .col_expr(incomes::Column::Amount, Expr::value(record.amount))
                    .col_expr(incomes::Column::Who, Expr::value(record.who))
                    .col_expr(incomes::Column::Category, Expr::value(record.category))
                    .filter(incomes::Column::Id.eq(id))
                    .exec(&self.database)
                    .await?
                    .rows_affected
            }
        };

        Ok(rows)
    }

    /// Deletes a record by id, returning the number of rows affected.
    pub async fn delete_by_id(&self, kind: RecordKind, id: i64) -> ResultStore<u64> {
        let rows = match kind {
            RecordKind::Expense => {
                expenses::Entity::delete_many()
                    .filter(expenses::Column::Id.eq(id))
                    .exec(&self.database)
                    .await?
                    .rows_affected
            }
            RecordKind::Income => {
                incomes::Entity::delete_many()
                    .filter(incomes::Column::Id.eq(id))
                    .exec(&self.database)
                    .await?
                    .rows_affected
            }
        };

        Ok(rows)
    }

    /// Bulk delete by `LIKE` pattern on the free-text date column.
    pub async fn delete_where_date_like(
        &self,
        kind: RecordKind,
        pattern: &str,
    ) -> ResultStore<u64> {
        let rows = match kind {
            RecordKind::Expense => {
                expenses::Entity::delete_many()
                    .filter(expenses::Column::Date.like(pattern))
                    .exec(&self.database)
                    .await?
                    .rows_affected
            }
            RecordKind::Income => {
                incomes::Entity::delete_many()
                    .filter(incomes::Column::Date.like(pattern))
                    .exec(&self.database)
                    .await?
                    .rows_affected
            }
        };

        Ok(rows)
    }

    pub async fn get_by_id(&self, kind: RecordKind, id: i64) -> ResultStore<Option<Record>> {
        let record = match kind {
            RecordKind::Expense => expenses::Entity::find_by_id(id)
                .one(&self.database)
                .await?
                .map(Record::from),
            RecordKind::Income => incomes::Entity::find_by_id(id)
                .one(&self.database)
                .await?
                .map(Record::from),
        };

        Ok(record)
    }

    /// Most recent records, ordered by date then id, both descending.
    ///
    /// The date column is ordered as a string (faithful to the stored
    /// `DD.MM.YYYY` free-text form).
    pub async fn list_recent(&self, kind: RecordKind, limit: u64) -> ResultStore<Vec<Record>> {
        let records = match kind {
            RecordKind::Expense => expenses::Entity::find()
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::Id)
                .limit(limit)
                .all(&self.database)
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
            RecordKind::Income => incomes::Entity::find()
                .order_by_desc(incomes::Column::Date)
                .order_by_desc(incomes::Column::Id)
                .limit(limit)
                .all(&self.database)
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
        };

        Ok(records)
    }
}

fn validate_amount(amount: f64) -> Result<(), StoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(StoreError::InvalidAmount(amount.to_string()));
    }
    Ok(())
}
