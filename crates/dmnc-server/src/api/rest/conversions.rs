//! Type conversion utilities
//!
//! The JSON/FEEL type bridge. JSON has no dates, durations or intervals, so
//! those travel as strings of the form `@"<FEEL literal>"`:
//!
//! ```text
//! date                 @"2024-01-15"
//! date and time        @"2024-01-15T10:30:00+01:00"
//! days and time        @"P1DT2H0M0S"
//! years and months     @"-P1Y6M"
//! range                @"[1 .. 10)"
//! ```

use dmnc_core::FeelValue;
use dmnc_parser::FeelParser;
use dmnc_runtime::Variables;

/// Largest magnitude emitted as a JSON integer
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert serde_json::Value to FeelValue.
///
/// Never fails: a `@"..."` string that does not hold a FEEL literal is kept
/// as the original string.
pub fn json_to_value(v: serde_json::Value) -> FeelValue {
    match v {
        serde_json::Value::Null => FeelValue::Null,
        serde_json::Value::Bool(b) => FeelValue::Bool(b),
        serde_json::Value::Number(n) => n.as_f64().map(FeelValue::Number).unwrap_or(FeelValue::Null),
        serde_json::Value::String(s) => decode_string(s),
        serde_json::Value::Array(arr) => {
            FeelValue::List(arr.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(obj) => FeelValue::Context(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

fn decode_string(s: String) -> FeelValue {
    let literal = s
        .strip_prefix("@\"")
        .and_then(|rest| rest.strip_suffix('"'));

    match literal {
        Some(text) => match FeelParser::parse_literal(text) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!("Keeping '{}' as a string: {}", s, err);
                FeelValue::String(s)
            }
        },
        None => FeelValue::String(s),
    }
}

/// Convert FeelValue to serde_json::Value
pub fn value_to_json(v: &FeelValue) -> serde_json::Value {
    match v {
        FeelValue::Null => serde_json::Value::Null,
        FeelValue::Bool(b) => serde_json::Value::Bool(*b),
        FeelValue::Number(n) => number_to_json(*n),
        FeelValue::String(s) => serde_json::Value::String(s.clone()),
        FeelValue::Date(_)
        | FeelValue::Time(_)
        | FeelValue::DateTime(_)
        | FeelValue::DayTimeDuration(_)
        | FeelValue::YearMonthDuration(_) => serde_json::Value::String(v.to_feel_literal()),
        FeelValue::Interval(interval) => {
            serde_json::Value::String(format!("@\"{}\"", interval.to_feel_literal()))
        }
        FeelValue::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        FeelValue::Context(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Decode a JSON request object into evaluation inputs
pub fn json_to_variables(obj: serde_json::Map<String, serde_json::Value>) -> Variables {
    obj.into_iter()
        .map(|(k, v)| (k, json_to_value(v)))
        .collect()
}

/// Encode evaluation outputs as a JSON object
pub fn variables_to_json(variables: &Variables) -> serde_json::Value {
    serde_json::Value::Object(
        variables
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect(),
    )
}

/// Decode the fields of an HTML form post.
///
/// A field is read as a FEEL literal when it parses as one (`30`, `true`,
/// `"x"`, `@"2024-01-15"`, `2024-01-15`), otherwise as plain text. Empty
/// fields are left out.
pub fn form_to_variables(fields: Vec<(String, String)>) -> Variables {
    fields
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(name, value)| {
            let parsed = FeelParser::parse_literal(value.trim())
                .unwrap_or_else(|_| FeelValue::String(value));
            (name, parsed)
        })
        .collect()
}
