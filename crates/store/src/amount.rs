//! Amount parsing and display helpers.
//!
//! Amounts arrive as free text typed into a chat. Both `.` and `,` work as
//! the decimal separator, and stray whitespace (including thousands-separator
//! spaces) is ignored:
//!
//! ```rust
//! use store::parse_amount;
//!
//! assert_eq!(parse_amount("2500.75").unwrap(), 2500.75);
//! assert_eq!(parse_amount("2500,75").unwrap(), 2500.75);
//! assert_eq!(parse_amount(" 2 500,75 ").unwrap(), 2500.75);
//! ```

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount must be positive: {0}")]
    NotPositive(String),
}

/// Parses a user-typed amount string into a float.
///
/// The first comma is treated as a decimal point; all whitespace is
/// stripped. Non-finite results are rejected.
pub fn parse_amount(input: &str) -> Result<f64, AmountError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(AmountError::Empty);
    }

    let cleaned = cleaned.replacen(',', ".", 1);
    let value: f64 = cleaned
        .parse()
        .map_err(|_| AmountError::Invalid(input.trim().to_string()))?;
    if !value.is_finite() {
        return Err(AmountError::Invalid(input.trim().to_string()));
    }
    Ok(value)
}

/// Like [`parse_amount`], but additionally requires the value to be `> 0`.
pub fn parse_positive_amount(input: &str) -> Result<f64, AmountError> {
    let value = parse_amount(input)?;
    if value <= 0.0 {
        return Err(AmountError::NotPositive(input.trim().to_string()));
    }
    Ok(value)
}

/// Renders an amount with exactly two decimal digits.
pub fn format_amount(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        String::from("0.00")
    }
}

/// Display-only fallback: missing input renders as zero.
pub fn format_amount_or_zero(value: Option<f64>) -> String {
    format_amount(value.unwrap_or(0.0))
}
