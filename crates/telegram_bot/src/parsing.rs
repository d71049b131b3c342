//! Free-text entry parsing.
//!
//! A record can be typed as one pipe-delimited line:
//!
//! `Дата | Описание | Сумма | Кто [| Категория]`
//!
//! Exactly 4 or 5 fields; the category defaults to the fixed placeholder.
//! The date is checked against the `DD.MM.YYYY` character pattern only —
//! stored dates are matched by substring, so only the shape matters.

use store::{DEFAULT_CATEGORY, NewRecord, parse_positive_amount};

/// Errors of the pipe-delimited entry format. The messages double as
/// user-facing correction hints.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum LineError {
    #[error("нужно 4 или 5 полей, разделённых «|», а получилось {0}")]
    FieldCount(usize),
    #[error("дата должна быть в формате ДД.ММ.ГГГГ, например 25.12.2023")]
    BadDate,
    #[error("описание не может быть пустым")]
    EmptyDescription,
    #[error("сумма должна быть положительным числом, например 2500,75")]
    BadAmount,
    #[error("не указано, кто платил")]
    EmptyPayer,
}

/// Quick check whether a message is meant as a pipe-delimited entry.
pub(crate) fn looks_like_entry_line(text: &str) -> bool {
    text.contains('|')
}

/// `DD.MM.YYYY` character pattern, deliberately not calendar-validated.
pub(crate) fn looks_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes[2] == b'.'
        && bytes[5] == b'.'
        && [0, 1, 3, 4, 6, 7, 8, 9]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

pub(crate) fn parse_entry_line(input: &str) -> Result<NewRecord, LineError> {
    let fields: Vec<&str> = input.split('|').map(str::trim).collect();
    if fields.len() != 4 && fields.len() != 5 {
        return Err(LineError::FieldCount(fields.len()));
    }

    let date = fields[0];
    if !looks_like_date(date) {
        return Err(LineError::BadDate);
    }

    let description = fields[1];
    if description.is_empty() {
        return Err(LineError::EmptyDescription);
    }

    let amount = parse_positive_amount(fields[2]).map_err(|_| LineError::BadAmount)?;

    let who = fields[3];
    if who.is_empty() {
        return Err(LineError::EmptyPayer);
    }

    let category = fields
        .get(4)
        .copied()
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);

    Ok(NewRecord {
        date: date.to_string(),
        description: description.to_string(),
        amount,
        who: who.to_string(),
        category: category.to_string(),
    })
}
