use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

const DAY_FORMAT: &str = "%Y%m%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("date not provided in the proper format: {0:?}")]
    InvalidDateFormat(String),
}

/// Parses a compact `YYYYMMDD` date string.
fn parse_day(raw: &str) -> Result<NaiveDate, CalendarError> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarError::InvalidDateFormat(raw.to_owned()));
    }
    let invalid = || CalendarError::InvalidDateFormat(raw.to_owned());
    let year: i32 = raw[..4].parse().map_err(|_| invalid())?;
    let month: u32 = raw[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = raw[6..].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Returns the `"YYYY/YYYY"` school year containing a compact `YYYYMMDD`
/// date. A school year runs from August 20 to August 19 of the next
/// calendar year.
pub fn school_year(date: &str) -> Result<String, CalendarError> {
    let day = parse_day(date)?;
    let start_year = if (day.month(), day.day()) >= (8, 20) {
        day.year()
    } else {
        day.year() - 1
    };
    Ok(format!("{}/{}", start_year, start_year + 1))
}

/// Returns the Sunday that starts and the Saturday that ends the week
/// containing `date`, both as compact `YYYYMMDD` strings. Every date maps
/// to the 7-day Sunday..Saturday span that contains it.
pub fn week_bounds(date: &str) -> Result<(String, String), CalendarError> {
    let day = parse_day(date)?;
    // Monday = 0 .. Sunday = 6.
    let weekday = i64::from(day.weekday().num_days_from_monday());
    let mut start_offset = -weekday - 1;
    if start_offset == -7 {
        start_offset = 0;
    }
    let mut end_offset = 5 - weekday;
    if end_offset < 0 {
        end_offset = 6;
    }
    let start = day + Duration::days(start_offset);
    let end = day + Duration::days(end_offset);
    Ok((
        start.format(DAY_FORMAT).to_string(),
        end.format(DAY_FORMAT).to_string(),
    ))
}
