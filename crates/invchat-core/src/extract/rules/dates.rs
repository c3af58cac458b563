//! Date parsing for model replies.

use chrono::NaiveDate;

use super::patterns::{DATE_DAY_FIRST, DATE_MONTH_FIRST, DATE_NUMERIC, DATE_YMD};

/// Parse the first date found in `s`.
///
/// Formats tried, in order:
/// - `YYYY-MM-DD` (also `/` and `.` separators)
/// - `DD.MM.YYYY` (dots mean day first)
/// - `MM/DD/YYYY` and `MM-DD-YYYY`, or day first when the first part is over 12
/// - `February 26, 2019`, `Feb 26th 2019`
/// - `26 February 2019`, `26-Feb-2019`
///
/// Two-digit years are placed in the 2000s.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_YMD.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_NUMERIC.captures(s) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[3].parse().ok()?;
        let year = parse_year(&caps[4])?;

        let (day, month) = if &caps[2] == "." || first > 12 {
            (first, second)
        } else {
            (second, first)
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_MONTH_FIRST.captures(s) {
        if let Some(month) = month_from_name(&caps[1]) {
            let day: u32 = caps[2].parse().ok()?;
            let year = parse_year(&caps[3])?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    if let Some(caps) = DATE_DAY_FIRST.captures(s) {
        if let Some(month) = month_from_name(&caps[2]) {
            let day: u32 = caps[1].parse().ok()?;
            let year = parse_year(&caps[3])?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    None
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(if year < 100 { 2000 + year } else { year })
}

fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
