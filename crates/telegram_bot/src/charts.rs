//! Monthly chart rendering via the QuickChart HTTP service.
//!
//! The chart spec is plain Chart.js JSON sent URL-encoded in the `c` query
//! parameter; the service replies with a PNG that is relayed to the chat.

use reqwest::Client;
use serde_json::{Value, json};

const QUICKCHART_URL: &str = "https://quickchart.io/chart";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ChartError {
    #[error("chart service request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Clone, Debug)]
pub(crate) struct ChartClient {
    client: Client,
    base_url: String,
}

impl ChartClient {
    pub(crate) fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: QUICKCHART_URL.to_string(),
        }
    }

    /// Fetches the PNG for one month's daily income/expense line chart.
    pub(crate) async fn month_chart_png(
        &self,
        month: &str,
        incomes: &[(u32, f64)],
        expenses: &[(u32, f64)],
    ) -> Result<Vec<u8>, ChartError> {
        let spec = month_chart_spec(month, incomes, expenses);
        let bytes = self
            .client
            .get(&self.base_url)
            .query(&[("c", spec.to_string())])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

/// Two-series line chart over the days of `month` (`MM.YYYY`).
fn month_chart_spec(month: &str, incomes: &[(u32, f64)], expenses: &[(u32, f64)]) -> Value {
    let days = days_in_month(month);
    let labels: Vec<u32> = (1..=days).collect();

    json!({
        "type": "line",
        "data": {
            "labels": labels,
            "datasets": [
                { "label": "Доходы", "data": day_series(days, incomes), "fill": false },
                { "label": "Расходы", "data": day_series(days, expenses), "fill": false },
            ],
        },
        "options": {
            "title": { "display": true, "text": format!("Доходы и расходы за {month}") },
        },
    })
}

/// Spreads sparse `(day, total)` pairs over a dense per-day vector.
fn day_series(days: u32, totals: &[(u32, f64)]) -> Vec<f64> {
    let mut series = vec![0.0; days as usize];
    for &(day, total) in totals {
        if (1..=days).contains(&day) {
            series[(day - 1) as usize] = total;
        }
    }
    series
}

/// Number of days in a `MM.YYYY` month; malformed input falls back to 31.
fn days_in_month(month: &str) -> u32 {
    let Some((m, y)) = month.split_once('.') else {
        return 31;
    };
    let (Ok(m), Ok(y)) = (m.parse::<u32>(), y.parse::<i32>()) else {
        return 31;
    };

    let first = chrono::NaiveDate::from_ymd_opt(y, m, 1);
    let next = if m == 12 {
        chrono::NaiveDate::from_ymd_opt(y + 1, 1, 1)
    } else {
        chrono::NaiveDate::from_ymd_opt(y, m + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 31,
    }
}
