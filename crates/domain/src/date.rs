//! Date input helpers.

use chrono::{Datelike, NaiveDate};

use crate::error::{DomainError, DomainResult};

/// Parses a user-entered date in `DD.MM.YYYY` or `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if neither format matches.
pub fn parse_user_date(input: &str) -> DomainResult<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| DomainError::InvalidDate(input.to_string()))
}

/// Normalizes a user-entered date to ISO `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the input is not a date.
pub fn to_iso_date(input: &str) -> DomainResult<String> {
    parse_user_date(input).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Formats a date the way the console displays it (`DD.MM.YYYY`).
#[must_use]
pub fn format_display(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// First and last day of the month containing `date`.
#[must_use]
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(date);
    (first, last)
}
