//! ISO-8601 text to FEEL temporal values

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use dmnc_core::{FeelDateTime, FeelTime, FeelValue};

/// Parse the contents of an `@"..."` literal.
///
/// Recognises durations (`P1DT2H`, `-P1Y2M`), dates (`2024-01-15`),
/// date-times (`2024-01-15T10:30:00Z`) and times (`10:30:00+02:00`).
pub fn parse_temporal(text: &str) -> Option<FeelValue> {
    let text = text.trim();
    if text.starts_with('P') || text.starts_with("-P") {
        return parse_duration(text);
    }
    if text.contains('T') {
        return parse_date_time(text).map(FeelValue::DateTime);
    }
    if text.contains(':') {
        return parse_time(text).map(FeelValue::Time);
    }
    parse_date(text).map(FeelValue::Date)
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

pub fn parse_time(text: &str) -> Option<FeelTime> {
    let text = text.trim();
    let (clock, offset) = split_offset(text)?;
    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .ok()?;
    Some(FeelTime::new(time, offset))
}

pub fn parse_date_time(text: &str) -> Option<FeelDateTime> {
    let (date, time) = text.trim().split_once('T')?;
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Some(FeelDateTime::new(date.and_time(time.time), time.offset))
}

/// Split a trailing `Z` or `+hh:mm`/`-hh:mm` offset off a clock reading
fn split_offset(text: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(clock) = text.strip_suffix('Z') {
        return Some((clock, FixedOffset::east_opt(0)));
    }
    match text.rfind(['+', '-']) {
        Some(pos) => {
            let (clock, offset) = text.split_at(pos);
            let sign = if offset.starts_with('-') { -1 } else { 1 };
            let (hours, minutes) = offset[1..].split_once(':')?;
            let hours: i32 = hours.parse().ok()?;
            let minutes: i32 = minutes.parse().ok()?;
            let seconds = sign * (hours * 3600 + minutes * 60);
            Some((clock, Some(FixedOffset::east_opt(seconds)?)))
        }
        None => Some((text, None)),
    }
}

/// Parse `[-]PnYnM` or `[-]PnDTnHnMnS`
pub fn parse_duration(text: &str) -> Option<FeelValue> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = body.strip_prefix('P')?;
    if body.is_empty() {
        return None;
    }

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return None,
        None => (body, None),
    };

    let date_fields = split_fields(date_part, &['Y', 'M', 'D'])?;
    let has_year_month = date_fields.iter().any(|(unit, _)| *unit == 'Y' || *unit == 'M');
    let has_days = date_fields.iter().any(|(unit, _)| *unit == 'D');

    if has_year_month {
        if has_days || time_part.is_some() {
            return None;
        }
        let mut months: i64 = 0;
        for (unit, amount) in &date_fields {
            let whole = whole_number(amount)?;
            let whole = if *unit == 'Y' { whole.checked_mul(12)? } else { whole };
            months = months.checked_add(whole)?;
        }
        return Some(FeelValue::YearMonthDuration(if negative { -months } else { months }));
    }

    let mut secs: i64 = 0;
    let mut nanos: u32 = 0;
    for (_, amount) in &date_fields {
        secs = secs.checked_add(whole_number(amount)?.checked_mul(86_400)?)?;
    }
    if let Some(time_part) = time_part {
        for (unit, amount) in split_fields(time_part, &['H', 'M', 'S'])? {
            let field = match unit {
                'H' => whole_number(&amount)?.checked_mul(3_600)?,
                'M' => whole_number(&amount)?.checked_mul(60)?,
                _ => {
                    let (whole, fraction) = split_seconds(&amount)?;
                    nanos = fraction;
                    whole
                }
            };
            secs = secs.checked_add(field)?;
        }
    }

    let delta = TimeDelta::new(secs, nanos)?;
    Some(FeelValue::DayTimeDuration(if negative { -delta } else { delta }))
}

/// Split `12.0015` into whole seconds and nanoseconds. Digits past the ninth are dropped.
fn split_seconds(amount: &str) -> Option<(i64, u32)> {
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole = if whole.is_empty() { 0 } else { whole_number(whole)? };
    let digits: String = fraction.chars().take(9).collect();
    let nanos = if digits.is_empty() {
        0
    } else {
        format!("{:0<9}", digits).parse().ok()?
    };
    Some((whole, nanos))
}

/// Split `1Y2M` into `[('Y', "1"), ('M', "2")]`, enforcing unit order
fn split_fields(text: &str, units: &[char]) -> Option<Vec<(char, String)>> {
    let mut fields = Vec::new();
    let mut amount = String::new();
    let mut next_unit = 0;
    for c in text.chars() {
        if c.is_ascii_digit() || c == '.' {
            amount.push(c);
            continue;
        }
        let position = units[next_unit..].iter().position(|u| *u == c)? + next_unit;
        if amount.is_empty() {
            return None;
        }
        fields.push((c, std::mem::take(&mut amount)));
        next_unit = position + 1;
    }
    if !amount.is_empty() {
        return None;
    }
    Some(fields)
}

fn whole_number(amount: &str) -> Option<i64> {
    amount.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_temporal("2024-01-15"),
            Some(FeelValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        );
        assert_eq!(parse_temporal("2024-02-30"), None);
    }

    #[test]
    fn test_parse_time_with_offset() {
        let Some(FeelValue::Time(time)) = parse_temporal("10:30:00+02:00") else {
            panic!("expected a time");
        };
        assert_eq!(time.offset, FixedOffset::east_opt(7200));
        assert_eq!(time.to_iso(), "10:30:00+02:00");
    }

    #[test]
    fn test_parse_date_time_utc() {
        let Some(FeelValue::DateTime(dt)) = parse_temporal("2024-01-15T10:30:00Z") else {
            panic!("expected a date-time");
        };
        assert_eq!(dt.offset, FixedOffset::east_opt(0));
        assert_eq!(dt.local.format("%H:%M").to_string(), "10:30");
    }

    #[test]
    fn test_parse_day_time_duration() {
        assert_eq!(
            parse_temporal("P1DT2H30M"),
            Some(FeelValue::DayTimeDuration(
                TimeDelta::try_minutes(24 * 60 + 150).unwrap()
            ))
        );
        assert_eq!(
            parse_temporal("-PT1.5S"),
            Some(FeelValue::DayTimeDuration(TimeDelta::try_milliseconds(-1500).unwrap()))
        );
    }

    #[test]
    fn test_parse_year_month_duration() {
        assert_eq!(parse_temporal("P1Y2M"), Some(FeelValue::YearMonthDuration(14)));
        assert_eq!(parse_temporal("-P3M"), Some(FeelValue::YearMonthDuration(-3)));
    }

    #[test]
    fn test_parse_sub_millisecond_seconds() {
        assert_eq!(
            parse_temporal("P0DT0H0M0.0015S"),
            Some(FeelValue::DayTimeDuration(TimeDelta::microseconds(1500)))
        );
        assert_eq!(
            parse_temporal("PT1.000000001S"),
            Some(FeelValue::DayTimeDuration(TimeDelta::new(1, 1).unwrap()))
        );
        assert_eq!(
            parse_temporal("-PT0.5S"),
            Some(FeelValue::DayTimeDuration(TimeDelta::try_milliseconds(-500).unwrap()))
        );
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        assert_eq!(parse_temporal("P99999999999999999D"), None);
        assert_eq!(parse_temporal("P999999999999999999Y"), None);
        assert_eq!(parse_temporal("PT9999999999999999H"), None);
        assert_eq!(parse_temporal("P768614336404564651Y"), None);
        assert_eq!(parse_temporal("P768614336404564650Y8M"), None);
    }

    #[test]
    fn test_reject_malformed_durations() {
        assert_eq!(parse_temporal("P"), None);
        assert_eq!(parse_temporal("P1Y2D"), None);
        assert_eq!(parse_temporal("PT"), None);
        assert_eq!(parse_temporal("P2M1Y"), None);
        assert_eq!(parse_temporal("PT1.2.3S"), None);
        assert_eq!(parse_temporal("PT.S"), None);
    }
}
