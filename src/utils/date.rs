// src/utils/date.rs

//! Date formats and parsing for artifact shipped dates.

use chrono::{DateTime, Days, NaiveDate};

use crate::error::{AppError, Result};

/// Format used by `Artifact`'s comma-joined representation.
pub const SERIAL_FORMAT: &str = "%m-%d-%Y";

/// Format used for the date column of table rows.
pub const TABLE_FORMAT: &str = "%m/%d/%Y";

/// Timestamp formats with a zone offset, tried in order.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%#z"];

/// Plain date formats, tried in order.
const DATE_FORMATS: [&str; 2] = [TABLE_FORMAT, "%Y-%m-%d"];

/// Day zero of spreadsheet serial date numbers.
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Format an optional date, rendering an unset date as an empty string.
pub fn format_date(date: Option<NaiveDate>, format: &str) -> String {
    date.map(|d| d.format(format).to_string()).unwrap_or_default()
}

/// Parse a date cell read back from a report table.
///
/// Accepts spreadsheet serial day numbers, zoned timestamps, `MM/DD/YYYY`
/// and `YYYY-MM-DD`. An empty cell is an unset date.
pub fn parse_cell(value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(serial) = value.parse::<f64>() {
        if !serial.is_finite() || serial < 0.0 {
            return Err(AppError::date(value, "serial day number out of range"));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let days = serial.trunc() as u64;
        return serial_epoch()
            .checked_add_days(Days::new(days))
            .map(Some)
            .ok_or_else(|| AppError::date(value, "serial day number out of range"));
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Ok(Some(ts.date_naive()));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(Some(date));
        }
    }

    Err(AppError::date(value, "unrecognized date format"))
}

/// Parse an RFC 3339 timestamp, returning `None` when it is malformed.
pub fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|ts| ts.date_naive())
}
