use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Render a number the way a key column compares it: integral values drop
/// the fractional part, everything else uses the shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.floor() as i64;
    let seconds = ((serial - serial.floor()) * SECONDS_PER_DAY).round() as i64;
    base.checked_add_signed(TimeDelta::try_days(days)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

pub fn format_excel_date(serial: f64) -> String {
    match excel_serial_to_datetime(serial) {
        Some(dt) if dt.time().num_seconds_from_midnight() == 0 => {
            dt.format("%Y-%m-%d").to_string()
        }
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => format_number(serial),
    }
}

/// Check if a number format code represents a date/time format.
///
/// Same scan as calamine's `detect_custom_number_format`: only the first
/// section counts, and `[h]`-style elapsed formats are durations, not dates.
pub fn is_date_format(format: &str) -> bool {
    let mut escaped = false;
    let mut in_quote = false;
    let mut brackets = 0u8;
    let mut prev = ' ';
    let mut elapsed = false;
    let mut am_pm = false;

    for c in format.chars() {
        match (c, escaped, in_quote, am_pm, brackets) {
            (_, true, ..) => escaped = false, // escaped char, skip
            ('_' | '\\', ..) => escaped = true,
            ('"', _, true, _, _) => in_quote = false,
            (_, _, true, _, _) => (), // inside quotes
            ('"', ..) => in_quote = true,
            (';', ..) => return false, // first section only
            ('[', ..) => brackets += 1,
            (']', .., 1) if elapsed => return false, // elapsed time
            (']', ..) => brackets = brackets.saturating_sub(1),
            ('a' | 'A', _, _, false, 0) => am_pm = true,
            ('p' | 'm' | '/' | 'P' | 'M', _, _, true, 0) => return true,
            ('d' | 'm' | 'h' | 'y' | 's' | 'D' | 'M' | 'H' | 'Y' | 'S', _, _, false, 0) => {
                return true;
            }
            _ => {
                if !(elapsed && c.eq_ignore_ascii_case(&prev)) {
                    elapsed = prev == '[' && matches!(c, 'm' | 'h' | 's' | 'M' | 'H' | 'S');
                }
            }
        }
        prev = c;
    }
    false
}
