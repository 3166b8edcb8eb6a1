//! Free-text date handling for form input.
//!
//! Agents type dates in whatever regional form their branch uses; the
//! remote store only accepts `YYYY-MM-DD` (and `YYYY-MM-DD HH:MM:SS` for
//! datetimes). Everything funnels through the two normalizers here before
//! a payload is built.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::{FieldOpsError, Result};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];
const TIME_SUFFIXES: &[&str] = &[" %H:%M:%S", " %H:%M"];

/// Normalize a free-text datetime to canonical `YYYY-MM-DD HH:MM:SS`.
///
/// Empty input means "now". A bare date gets a midnight time component.
pub fn normalize_datetime(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    }

    for date_format in DATE_FORMATS {
        for time_suffix in TIME_SUFFIXES {
            let format = format!("{date_format}{time_suffix}");
            if let Ok(parsed) = NaiveDateTime::parse_from_str(input, &format) {
                return Ok(parsed.format("%Y-%m-%d %H:%M:%S").to_string());
            }
        }
        if let Ok(parsed) = NaiveDate::parse_from_str(input, date_format) {
            return Ok(format!("{} 00:00:00", parsed.format("%Y-%m-%d")));
        }
    }

    Err(FieldOpsError::InvalidDate(input.to_string()))
}

/// Normalize a free-text date to canonical `YYYY-MM-DD`. Empty input means
/// "today".
pub fn normalize_date(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Local::now().date_naive().format("%Y-%m-%d").to_string());
    }

    for date_format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(input, date_format) {
            return Ok(parsed.format("%Y-%m-%d").to_string());
        }
    }

    Err(FieldOpsError::InvalidDate(input.to_string()))
}
