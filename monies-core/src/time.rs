//! Date utilities: zone-anchored calendar dates and year resolution.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use chrono_tz::Tz;

use crate::error::{ParseError, Result};

/// Leap years are at most eight years apart (1896 -> 1904), so a 29 Feb
/// always finds a home within this window.
const YEAR_SEARCH: i32 = 8;

/// Anchor a calendar date at local midnight in `zone`.
pub fn local_midnight(date: NaiveDate, zone: Tz) -> Result<DateTime<Tz>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| zone.from_local_datetime(&midnight).earliest())
        .ok_or_else(|| {
            ParseError::Format(format!("{date} has no local midnight in {zone}"))
        })
}

/// Place a date whose year is unknown in the year window ending at
/// `reference`: take the reference year, and step back a year if that lands
/// after the reference.
///
/// Returns `None` only when no year in the window can hold the day, which
/// cannot happen for a real calendar day.
pub fn fix_year(date: NaiveDate, reference: NaiveDate) -> Option<NaiveDate> {
    (0..=YEAR_SEARCH)
        .filter_map(|back| date.with_year(reference.year() - back))
        .find(|d| *d <= reference)
}
