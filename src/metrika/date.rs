//! Date helpers for Yandex Metrika query parameters.

use crate::error::{MetrikaError, MetrikaResult};
use chrono::{Duration, Local};

/// Validate an optional `YYYY-MM-DD` date string.
///
/// `None` passes through unchanged. The check is shape-only (four digits,
/// dash, two digits, dash, two digits); calendar validity is left to the
/// upstream API, so `2024-02-31` is accepted here.
pub fn validate_date(value: Option<&str>) -> MetrikaResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if is_date_shaped(value) {
        Ok(Some(value.to_string()))
    } else {
        Err(MetrikaError::validation(
            "date",
            format!("must be in YYYY-MM-DD format, got: {value:?}"),
        ))
    }
}

fn is_date_shaped(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Return `(date_from, date_to)` for the trailing `days`-day window ending today.
pub fn default_date_range(days: i64) -> (String, String) {
    let today = Local::now().date_naive();
    let from = today - Duration::days(days);
    (
        from.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}
