//! Display formatting for appointment dates and times

use chrono::{NaiveDate, NaiveTime};

use crate::error::{DermascanError, Result};

/// Formats a date as `May 1, 2024`.
///
/// Accepts `YYYY-MM-DD` or any ISO-8601 timestamp starting with one.
/// Unparseable input is returned unchanged.
pub fn format_date(raw: &str) -> String {
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Formats a 24-hour `HH:MM` time as `2:30 PM`.
///
/// Unparseable input is returned unchanged.
pub fn format_time(raw: &str) -> String {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|time| time.format("%-I:%M %p").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Normalizes a picked time to 24-hour `HH:MM`.
///
/// `2:30 PM` becomes `14:30`, `12 AM` becomes `00:00`; input that is
/// already 24-hour is zero-padded.
///
/// # Errors
///
/// Returns `DermascanError::Validation` when the time cannot be read.
pub fn to_24_hour(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let invalid = || DermascanError::Validation(format!("Invalid time: {}", raw));

    let (clock, period) = match raw.split_once(' ') {
        Some((clock, period)) => (clock, Some(period.trim().to_uppercase())),
        None => (raw, None),
    };
    let (hours, minutes) = clock.split_once(':').unwrap_or((clock, "00"));
    let mut hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;

    match period.as_deref() {
        Some("PM") if (1..=12).contains(&hours) => {
            if hours != 12 {
                hours += 12;
            }
        }
        Some("AM") if (1..=12).contains(&hours) => {
            if hours == 12 {
                hours = 0;
            }
        }
        None => {}
        _ => return Err(invalid().into()),
    }

    if hours > 23 || minutes > 59 {
        return Err(invalid().into());
    }
    Ok(format!("{:02}:{:02}", hours, minutes))
}
