//! Aggregate queries for the statistics and report screens.
//!
//! Aggregates run as raw parameterized statements against the table named
//! by [`RecordKind::table`]; the identifier is always one of the two
//! compile-time constants.

use sea_orm::{ConnectionTrait, Statement};

use crate::{RecordKind, ResultStore, Store};

/// Grouped sum and count, e.g. per payer or per category.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupTotal {
    pub group: String,
    pub total: f64,
    pub count: i64,
}

impl Store {
    /// Overall `(sum, count)` for one table.
    pub async fn totals(&self, kind: RecordKind) -> ResultStore<(f64, i64)> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0.0) AS total, COUNT(*) AS cnt FROM {}",
            kind.table()
        );
        let stmt = Statement::from_string(self.database().get_database_backend(), sql);
        self.totals_row(stmt).await
    }

    /// `(sum, count)` restricted to dates matching a `LIKE` pattern.
    pub async fn totals_where_date_like(
        &self,
        kind: RecordKind,
        pattern: &str,
    ) -> ResultStore<(f64, i64)> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0.0) AS total, COUNT(*) AS cnt \
             FROM {} WHERE date LIKE ?",
            kind.table()
        );
        let stmt = Statement::from_sql_and_values(
            self.database().get_database_backend(),
            sql,
            vec![pattern.into()],
        );
        self.totals_row(stmt).await
    }

    async fn totals_row(&self, stmt: Statement) -> ResultStore<(f64, i64)> {
        let Some(row) = self.database().query_one(stmt).await? else {
            return Ok((0.0, 0));
        };
        let total: f64 = row.try_get("", "total")?;
        let count: i64 = row.try_get("", "cnt")?;
        Ok((total, count))
    }

    /// Sum and count per payer, largest sum first.
    pub async fn sum_by_payer(
        &self,
        kind: RecordKind,
        date_pattern: Option<&str>,
    ) -> ResultStore<Vec<GroupTotal>> {
        let filter = if date_pattern.is_some() {
            " WHERE date LIKE ?"
        } else {
            ""
        };
        let sql = format!(
            "SELECT who AS grp, COALESCE(SUM(amount), 0.0) AS total, COUNT(*) AS cnt \
             FROM {}{filter} GROUP BY who ORDER BY total DESC",
            kind.table()
        );
        let values: Vec<sea_orm::Value> = date_pattern.into_iter().map(Into::into).collect();
        let stmt = Statement::from_sql_and_values(
            self.database().get_database_backend(),
            sql,
            values,
        );
        self.group_rows(stmt).await
    }

    /// Sum and count per category, largest sum first.
    pub async fn sum_by_category(&self, kind: RecordKind) -> ResultStore<Vec<GroupTotal>> {
        let sql = format!(
            "SELECT category AS grp, COALESCE(SUM(amount), 0.0) AS total, COUNT(*) AS cnt \
             FROM {} GROUP BY category ORDER BY total DESC",
            kind.table()
        );
        let stmt = Statement::from_string(self.database().get_database_backend(), sql);
        self.group_rows(stmt).await
    }

    async fn group_rows(&self, stmt: Statement) -> ResultStore<Vec<GroupTotal>> {
        let rows = self.database().query_all(stmt).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(GroupTotal {
                group: row.try_get("", "grp")?,
                total: row.try_get("", "total")?,
                count: row.try_get("", "cnt")?,
            });
        }
        Ok(out)
    }

    /// Per-day-of-month sums for one month, for chart rendering.
    ///
    /// `pattern` is a month `LIKE` pattern (`%.MM.YYYY`). The day is the
    /// leading `DD` substring of the stored date; rows whose date does not
    /// start with two digits are skipped.
    pub async fn daily_totals(
        &self,
        kind: RecordKind,
        pattern: &str,
    ) -> ResultStore<Vec<(u32, f64)>> {
        let sql = format!(
            "SELECT substr(date, 1, 2) AS day, COALESCE(SUM(amount), 0.0) AS total \
             FROM {} WHERE date LIKE ? GROUP BY day ORDER BY day",
            kind.table()
        );
        let stmt = Statement::from_sql_and_values(
            self.database().get_database_backend(),
            sql,
            vec![pattern.into()],
        );

        let rows = self.database().query_all(stmt).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let day: String = row.try_get("", "day")?;
            let Ok(day) = day.parse::<u32>() else {
                continue;
            };
            let total: f64 = row.try_get("", "total")?;
            out.push((day, total));
        }
        Ok(out)
    }
}
