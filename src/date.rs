//! Cover-date parsing and formatting

use chrono::{Local, NaiveDate};

use crate::error::{Error, Result};

/// Parse a date argument for the cover page.
///
/// Supported formats:
/// - `"today"` → the current local date
/// - `"2026-08-05"` → explicit date (ISO format)
/// - `"8/5/2026"` → explicit date (US format)
pub fn parse_date_arg(expr: &str) -> Result<NaiveDate> {
    let expr = expr.trim();

    if expr.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%m/%d/%Y") {
        return Ok(date);
    }

    Err(Error::InvalidDate(expr.to_string()))
}

/// Format a date in the standard format: "Month day, year"
/// Example: "November 20, 2024"
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
