//! Runtime value types for FEEL expressions
//!
//! `FeelValue` is the internal currency for request and response payloads.
//! It is a superset of JSON: besides the JSON scalars it carries dates, times,
//! date-times, both duration kinds and intervals, none of which JSON can
//! represent natively.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Runtime value type
#[derive(Debug, Clone, PartialEq)]
pub enum FeelValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (FEEL makes no integer/float distinction)
    Number(f64),
    /// String value
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day, optionally with an offset
    Time(FeelTime),
    /// Date and time, optionally with an offset
    DateTime(FeelDateTime),
    /// Days and time duration
    DayTimeDuration(TimeDelta),
    /// Years and months duration, stored as a signed month count
    YearMonthDuration(i64),
    /// Range with inclusive/exclusive ends
    Interval(Box<Interval>),
    /// Ordered list of values
    List(Vec<FeelValue>),
    /// Key-value context
    Context(BTreeMap<String, FeelValue>),
}

/// Time of day with an optional UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeelTime {
    pub time: NaiveTime,
    pub offset: Option<FixedOffset>,
}

/// Date and time with an optional UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeelDateTime {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

/// FEEL interval (range)
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start_closed: bool,
    pub start: FeelValue,
    pub end: FeelValue,
    pub end_closed: bool,
}

impl FeelTime {
    pub fn new(time: NaiveTime, offset: Option<FixedOffset>) -> Self {
        Self { time, offset }
    }

    /// ISO-8601 rendering, e.g. `13:45:00` or `13:45:00.5+10:00`
    pub fn to_iso(&self) -> String {
        let mut out = self.time.format("%H:%M:%S%.f").to_string();
        if let Some(offset) = self.offset {
            out.push_str(&offset.to_string());
        }
        out
    }

    /// Seconds since midnight UTC when an offset is known, local otherwise
    fn comparable_seconds(&self) -> f64 {
        let secs = f64::from(self.time.num_seconds_from_midnight())
            + f64::from(self.time.nanosecond()) / 1e9;
        match self.offset {
            Some(offset) => secs - f64::from(offset.local_minus_utc()),
            None => secs,
        }
    }
}

impl FeelDateTime {
    pub fn new(local: NaiveDateTime, offset: Option<FixedOffset>) -> Self {
        Self { local, offset }
    }

    /// ISO-8601 rendering with a `T` separator
    pub fn to_iso(&self) -> String {
        let mut out = self.local.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
        if let Some(offset) = self.offset {
            out.push_str(&offset.to_string());
        }
        out
    }

    fn with_offset(&self) -> Option<DateTime<FixedOffset>> {
        self.offset
            .and_then(|offset| self.local.and_local_timezone(offset).single())
    }
}

impl Interval {
    pub fn new(start_closed: bool, start: FeelValue, end: FeelValue, end_closed: bool) -> Self {
        Self {
            start_closed,
            start,
            end,
            end_closed,
        }
    }

    /// Whether `value` lies inside the interval.
    ///
    /// Returns `None` when the value cannot be ordered against the bounds.
    pub fn contains(&self, value: &FeelValue) -> Option<bool> {
        let low = value.compare(&self.start)?;
        let high = value.compare(&self.end)?;
        let above_start = match low {
            Ordering::Greater => true,
            Ordering::Equal => self.start_closed,
            Ordering::Less => false,
        };
        let below_end = match high {
            Ordering::Less => true,
            Ordering::Equal => self.end_closed,
            Ordering::Greater => false,
        };
        Some(above_start && below_end)
    }

    /// FEEL rendering, e.g. `[1 .. 10)`
    pub fn to_feel_literal(&self) -> String {
        format!(
            "{}{} .. {}{}",
            if self.start_closed { '[' } else { '(' },
            self.start.to_feel_literal(),
            self.end.to_feel_literal(),
            if self.end_closed { ']' } else { ')' },
        )
    }
}

impl FeelValue {
    /// FEEL type name of this value
    pub fn kind(&self) -> &'static str {
        match self {
            FeelValue::Null => "null",
            FeelValue::Bool(_) => "boolean",
            FeelValue::Number(_) => "number",
            FeelValue::String(_) => "string",
            FeelValue::Date(_) => "date",
            FeelValue::Time(_) => "time",
            FeelValue::DateTime(_) => "date and time",
            FeelValue::DayTimeDuration(_) => "days and time duration",
            FeelValue::YearMonthDuration(_) => "years and months duration",
            FeelValue::Interval(_) => "range",
            FeelValue::List(_) => "list",
            FeelValue::Context(_) => "context",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FeelValue::Null)
    }

    pub fn interval(start_closed: bool, start: FeelValue, end: FeelValue, end_closed: bool) -> Self {
        FeelValue::Interval(Box::new(Interval::new(start_closed, start, end, end_closed)))
    }

    /// Order two values of the same kind.
    ///
    /// Values of different kinds, booleans, nulls and structured values are
    /// not ordered and yield `None`.
    pub fn compare(&self, other: &FeelValue) -> Option<Ordering> {
        match (self, other) {
            (FeelValue::Number(l), FeelValue::Number(r)) => l.partial_cmp(r),
            (FeelValue::String(l), FeelValue::String(r)) => Some(l.cmp(r)),
            (FeelValue::Date(l), FeelValue::Date(r)) => Some(l.cmp(r)),
            (FeelValue::Time(l), FeelValue::Time(r)) => {
                if l.offset.is_some() != r.offset.is_some() {
                    return None;
                }
                l.comparable_seconds().partial_cmp(&r.comparable_seconds())
            }
            (FeelValue::DateTime(l), FeelValue::DateTime(r)) => {
                match (l.with_offset(), r.with_offset()) {
                    (Some(l), Some(r)) => Some(l.cmp(&r)),
                    _ if l.offset.is_none() && r.offset.is_none() => Some(l.local.cmp(&r.local)),
                    _ => None,
                }
            }
            // A date compares against a date-time as midnight of that day
            (FeelValue::Date(l), FeelValue::DateTime(r)) if r.offset.is_none() => {
                l.and_hms_opt(0, 0, 0).map(|midnight| midnight.cmp(&r.local))
            }
            (FeelValue::DateTime(l), FeelValue::Date(r)) if l.offset.is_none() => {
                r.and_hms_opt(0, 0, 0).map(|midnight| l.local.cmp(&midnight))
            }
            (FeelValue::DayTimeDuration(l), FeelValue::DayTimeDuration(r)) => Some(l.cmp(r)),
            (FeelValue::YearMonthDuration(l), FeelValue::YearMonthDuration(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    /// FEEL equality.
    ///
    /// Returns `None` when the operands are of incompatible kinds.
    pub fn feel_eq(&self, other: &FeelValue) -> Option<bool> {
        match (self, other) {
            (FeelValue::Null, FeelValue::Null) => Some(true),
            (FeelValue::Null, _) | (_, FeelValue::Null) => Some(false),
            (FeelValue::Bool(l), FeelValue::Bool(r)) => Some(l == r),
            (FeelValue::List(l), FeelValue::List(r)) => Some(l == r),
            (FeelValue::Context(l), FeelValue::Context(r)) => Some(l == r),
            (FeelValue::Interval(l), FeelValue::Interval(r)) => Some(l == r),
            _ => self.compare(other).map(|ord| ord == Ordering::Equal),
        }
    }

    /// Render as FEEL source text.
    ///
    /// Temporal values use the `@"..."` literal form so that the output can
    /// be parsed back by the FEEL literal parser.
    pub fn to_feel_literal(&self) -> String {
        match self {
            FeelValue::Null => "null".to_string(),
            FeelValue::Bool(b) => b.to_string(),
            FeelValue::Number(n) => format_number(*n),
            FeelValue::String(s) => quote_string(s),
            FeelValue::Date(d) => format!("@\"{}\"", d.format("%Y-%m-%d")),
            FeelValue::Time(t) => format!("@\"{}\"", t.to_iso()),
            FeelValue::DateTime(dt) => format!("@\"{}\"", dt.to_iso()),
            FeelValue::DayTimeDuration(d) => format!("@\"{}\"", format_day_time_duration(d)),
            FeelValue::YearMonthDuration(m) => {
                format!("@\"{}\"", format_year_month_duration(*m))
            }
            FeelValue::Interval(interval) => interval.to_feel_literal(),
            FeelValue::List(items) => {
                let parts: Vec<String> = items.iter().map(FeelValue::to_feel_literal).collect();
                format!("[{}]", parts.join(", "))
            }
            FeelValue::Context(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", quote_string(k), v.to_feel_literal()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for FeelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeelValue::String(s) => f.write_str(s),
            other => f.write_str(&other.to_feel_literal()),
        }
    }
}

impl From<bool> for FeelValue {
    fn from(b: bool) -> Self {
        FeelValue::Bool(b)
    }
}

impl From<f64> for FeelValue {
    fn from(n: f64) -> Self {
        FeelValue::Number(n)
    }
}

impl From<i64> for FeelValue {
    fn from(n: i64) -> Self {
        FeelValue::Number(n as f64)
    }
}

impl From<&str> for FeelValue {
    fn from(s: &str) -> Self {
        FeelValue::String(s.to_string())
    }
}

impl From<String> for FeelValue {
    fn from(s: String) -> Self {
        FeelValue::String(s)
    }
}

impl From<NaiveDate> for FeelValue {
    fn from(d: NaiveDate) -> Self {
        FeelValue::Date(d)
    }
}

/// Render a number without a trailing `.0` when it is integral
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// ISO-8601 days and time duration: `[-]P<d>DT<h>H<m>M<s>S`
pub fn format_day_time_duration(duration: &TimeDelta) -> String {
    let (sign, magnitude) = if *duration < TimeDelta::zero() {
        ("-", -*duration)
    } else {
        ("", *duration)
    };
    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let seconds = if nanos == 0 {
        seconds.to_string()
    } else {
        let fraction = format!("{:09}", nanos);
        format!("{}.{}", seconds, fraction.trim_end_matches('0'))
    };
    format!("{}P{}DT{}H{}M{}S", sign, days, hours, minutes, seconds)
}

/// ISO-8601 years and months duration: `[-]P<y>Y<m>M`
pub fn format_year_month_duration(months: i64) -> String {
    let sign = if months < 0 { "-" } else { "" };
    let months = months.unsigned_abs();
    format!("{}P{}Y{}M", sign, months / 12, months % 12)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(FeelValue::Null.kind(), "null");
        assert_eq!(FeelValue::Number(1.0).kind(), "number");
        assert_eq!(FeelValue::Date(date(2024, 1, 15)).kind(), "date");
        assert_eq!(FeelValue::YearMonthDuration(3).kind(), "years and months duration");
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(0.1), "0.1");
    }

    #[test]
    fn test_date_literal() {
        let value = FeelValue::Date(date(2024, 1, 15));
        assert_eq!(value.to_feel_literal(), "@\"2024-01-15\"");
    }

    #[test]
    fn test_time_literal_with_offset() {
        let time = FeelTime::new(
            NaiveTime::from_hms_opt(13, 45, 0).unwrap(),
            FixedOffset::east_opt(10 * 3600),
        );
        assert_eq!(time.to_iso(), "13:45:00+10:00");
    }

    #[test]
    fn test_date_time_literal() {
        let dt = FeelDateTime::new(date(2024, 1, 15).and_hms_opt(9, 30, 0).unwrap(), None);
        assert_eq!(FeelValue::DateTime(dt).to_feel_literal(), "@\"2024-01-15T09:30:00\"");
    }

    #[test]
    fn test_day_time_duration_format() {
        let d = TimeDelta::days(1) + TimeDelta::hours(2) + TimeDelta::minutes(3) + TimeDelta::seconds(4);
        assert_eq!(format_day_time_duration(&d), "P1DT2H3M4S");

        let negative = -TimeDelta::milliseconds(1500);
        assert_eq!(format_day_time_duration(&negative), "-P0DT0H0M1.5S");
    }

    #[test]
    fn test_year_month_duration_format() {
        assert_eq!(format_year_month_duration(14), "P1Y2M");
        assert_eq!(format_year_month_duration(-5), "-P0Y5M");
        assert_eq!(
            format_year_month_duration(i64::MIN),
            "-P768614336404564650Y8M"
        );
    }

    #[test]
    fn test_interval_literal() {
        let interval = Interval::new(true, FeelValue::Number(1.0), FeelValue::Number(10.0), false);
        assert_eq!(interval.to_feel_literal(), "[1 .. 10)");
    }

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(true, FeelValue::Number(18.0), FeelValue::Number(65.0), false);
        assert_eq!(interval.contains(&FeelValue::Number(18.0)), Some(true));
        assert_eq!(interval.contains(&FeelValue::Number(65.0)), Some(false));
        assert_eq!(interval.contains(&FeelValue::Number(17.0)), Some(false));
        assert_eq!(interval.contains(&FeelValue::String("x".into())), None);
    }

    #[test]
    fn test_compare_mixed_kinds() {
        assert_eq!(FeelValue::Number(1.0).compare(&FeelValue::String("1".into())), None);
        assert_eq!(FeelValue::Bool(true).compare(&FeelValue::Bool(true)), None);
    }

    #[test]
    fn test_compare_times_with_offsets() {
        let utc = FeelTime::new(NaiveTime::from_hms_opt(2, 0, 0).unwrap(), FixedOffset::east_opt(0));
        let aest = FeelTime::new(
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            FixedOffset::east_opt(10 * 3600),
        );
        assert_eq!(
            FeelValue::Time(utc).compare(&FeelValue::Time(aest)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_feel_eq() {
        assert_eq!(FeelValue::Null.feel_eq(&FeelValue::Null), Some(true));
        assert_eq!(FeelValue::Number(1.0).feel_eq(&FeelValue::Null), Some(false));
        assert_eq!(FeelValue::Bool(true).feel_eq(&FeelValue::Bool(true)), Some(true));
        assert_eq!(FeelValue::Number(1.0).feel_eq(&FeelValue::Bool(true)), None);
    }

    #[test]
    fn test_context_literal_is_sorted() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), FeelValue::Number(2.0));
        map.insert("a".to_string(), FeelValue::String("x".into()));
        assert_eq!(FeelValue::Context(map).to_feel_literal(), "{\"a\": \"x\", \"b\": 2}");
    }

    #[test]
    fn test_display_string_is_unquoted() {
        assert_eq!(FeelValue::from("Approved").to_string(), "Approved");
        assert_eq!(FeelValue::from(true).to_string(), "true");
    }
}
