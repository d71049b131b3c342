//! Calendar-based retention sweep.
//!
//! On the 5th day of each month every row dated in the previous calendar
//! month is deleted from both ledger tables. Dates are free-text
//! `DD.MM.YYYY` strings, so the month is matched with a `LIKE %.MM.YYYY`
//! pattern. Deletions are unconditional and irreversible.
//!
//! The wall clock is injected through [`Clock`] so tests can pin "today".

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Europe::Moscow;

use crate::{RecordKind, Store};

/// Day of month on which the sweep fires.
pub const SWEEP_DAY: u32 = 5;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the bot's home timezone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&Moscow).date_naive()
    }
}

pub fn sweep_due(today: NaiveDate) -> bool {
    today.day() == SWEEP_DAY
}

/// `(month, year)` of the calendar month before `today`.
pub fn previous_month(today: NaiveDate) -> (u32, i32) {
    if today.month() == 1 {
        (12, today.year() - 1)
    } else {
        (today.month() - 1, today.year())
    }
}

/// `LIKE` pattern matching every `DD.MM.YYYY` date in the given month.
pub fn month_pattern(month: u32, year: i32) -> String {
    format!("%.{month:02}.{year}")
}

pub fn previous_month_pattern(today: NaiveDate) -> String {
    let (month, year) = previous_month(today);
    month_pattern(month, year)
}

/// Outcome of one sweep pass. `None` means the delete on that table failed.
#[derive(Clone, Debug)]
pub struct SweepReport {
    pub pattern: String,
    pub expenses_deleted: Option<u64>,
    pub incomes_deleted: Option<u64>,
}

impl SweepReport {
    pub fn deleted(&self) -> u64 {
        self.expenses_deleted.unwrap_or(0) + self.incomes_deleted.unwrap_or(0)
    }
}

impl Store {
    /// Deletes all rows dated in the month before `today` from both tables.
    ///
    /// The two deletes run independently: a failure on one table never
    /// blocks the other. Failures are logged, not retried.
    pub async fn sweep_previous_month(&self, today: NaiveDate) -> SweepReport {
        let pattern = previous_month_pattern(today);
        let expenses_deleted = self.sweep_table(RecordKind::Expense, &pattern).await;
        let incomes_deleted = self.sweep_table(RecordKind::Income, &pattern).await;

        SweepReport {
            pattern,
            expenses_deleted,
            incomes_deleted,
        }
    }

    async fn sweep_table(&self, kind: RecordKind, pattern: &str) -> Option<u64> {
        match self.delete_where_date_like(kind, pattern).await {
            Ok(rows) => {
                tracing::info!(table = kind.table(), pattern, rows, "retention sweep");
                Some(rows)
            }
            Err(err) => {
                tracing::error!(table = kind.table(), pattern, "retention sweep failed: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn due_only_on_the_fifth() {
        assert!(sweep_due(date(2024, 3, 5)));
        assert!(!sweep_due(date(2024, 3, 4)));
        assert!(!sweep_due(date(2024, 3, 6)));
    }

    #[test]
    fn pattern_targets_previous_month() {
        assert_eq!(previous_month_pattern(date(2024, 3, 5)), "%.02.2024");
    }

    #[test]
    fn january_rolls_over_to_december() {
        assert_eq!(previous_month(date(2024, 1, 5)), (12, 2023));
        assert_eq!(previous_month_pattern(date(2024, 1, 5)), "%.12.2023");
    }
}
