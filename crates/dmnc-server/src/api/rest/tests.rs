//! Tests for REST API components

#![cfg(test)]

use super::conversions::*;
use super::types::*;
use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use dmnc_core::{FeelDateTime, FeelTime, FeelValue};
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> FeelValue {
    FeelValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn clock(h: u32, m: u32, s: u32, milli: u32) -> NaiveTime {
    NaiveTime::from_hms_milli_opt(h, m, s, milli).unwrap()
}

#[test]
fn test_json_to_value_conversion() {
    let json = json!({
        "string": "test",
        "number": 42,
        "bool": true,
        "null": null
    });

    let value = json_to_value(json);

    if let FeelValue::Context(map) = value {
        assert!(matches!(map.get("string"), Some(FeelValue::String(_))));
        assert!(matches!(map.get("number"), Some(FeelValue::Number(_))));
        assert!(matches!(map.get("bool"), Some(FeelValue::Bool(true))));
        assert!(matches!(map.get("null"), Some(FeelValue::Null)));
    } else {
        panic!("Expected Context");
    }
}

#[test]
fn test_json_to_value_number() {
    assert_eq!(json_to_value(json!(42)), FeelValue::Number(42.0));
    assert_eq!(json_to_value(json!(-0.25)), FeelValue::Number(-0.25));
}

#[test]
fn test_json_to_value_temporal_strings() {
    assert_eq!(json_to_value(json!("@\"2024-01-15\"")), date(2024, 1, 15));
    assert_eq!(
        json_to_value(json!("@\"P1DT2H0M0S\"")),
        FeelValue::DayTimeDuration(TimeDelta::try_hours(26).unwrap())
    );
    assert_eq!(
        json_to_value(json!("@\"-P1Y6M\"")),
        FeelValue::YearMonthDuration(-18)
    );
    assert_eq!(
        json_to_value(json!("@\"10:30:00+01:00\"")),
        FeelValue::Time(FeelTime::new(
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            FixedOffset::east_opt(3600)
        ))
    );
}

#[test]
fn test_plain_strings_stay_strings() {
    // No literal marker: an ISO date is just text
    assert_eq!(
        json_to_value(json!("2024-01-15")),
        FeelValue::String("2024-01-15".to_string())
    );
    assert_eq!(
        json_to_value(json!("@\"abc\"")),
        FeelValue::String("@\"abc\"".to_string())
    );
    assert_eq!(
        json_to_value(json!("@\"2024-13-45\"")),
        FeelValue::String("@\"2024-13-45\"".to_string())
    );
}

#[test]
fn test_value_to_json_numbers() {
    assert_eq!(value_to_json(&FeelValue::Number(3.0)), json!(3));
    assert!(value_to_json(&FeelValue::Number(3.0)).is_i64());
    assert_eq!(value_to_json(&FeelValue::Number(0.1)), json!(0.1));
    assert_eq!(value_to_json(&FeelValue::Number(f64::NAN)), json!(null));
    assert_eq!(value_to_json(&FeelValue::Number(f64::INFINITY)), json!(null));
    // Beyond 2^53 the value stays a float
    assert!(value_to_json(&FeelValue::Number(1e17)).is_f64());
}

#[test]
fn test_value_to_json_temporal() {
    assert_eq!(value_to_json(&date(2024, 1, 15)), json!("@\"2024-01-15\""));
    assert_eq!(
        value_to_json(&FeelValue::DayTimeDuration(TimeDelta::try_days(2).unwrap())),
        json!("@\"P2DT0H0M0S\"")
    );
    assert_eq!(
        value_to_json(&FeelValue::YearMonthDuration(14)),
        json!("@\"P1Y2M\"")
    );
}

#[test]
fn test_round_trip_every_kind() {
    let value = FeelValue::Context(
        [
            ("null".to_string(), FeelValue::Null),
            ("flag".to_string(), FeelValue::Bool(false)),
            ("amount".to_string(), FeelValue::Number(1250.5)),
            ("count".to_string(), FeelValue::Number(7.0)),
            ("name".to_string(), FeelValue::from("Ann")),
            ("born".to_string(), date(1990, 5, 1)),
            (
                "term".to_string(),
                FeelValue::DayTimeDuration(TimeDelta::try_minutes(90).unwrap()),
            ),
            ("age".to_string(), FeelValue::YearMonthDuration(30)),
            (
                "settle".to_string(),
                FeelValue::DayTimeDuration(TimeDelta::microseconds(1500)),
            ),
            (
                "refund".to_string(),
                FeelValue::DayTimeDuration(-TimeDelta::new(86_461, 250_000_000).unwrap()),
            ),
            (
                "opens".to_string(),
                FeelValue::Time(FeelTime::new(clock(9, 0, 0, 0), None)),
            ),
            (
                "closes".to_string(),
                FeelValue::Time(FeelTime::new(
                    clock(17, 30, 15, 500),
                    FixedOffset::east_opt(-5 * 3600),
                )),
            ),
            (
                "submitted".to_string(),
                FeelValue::DateTime(FeelDateTime::new(
                    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_time(clock(8, 15, 0, 0)),
                    None,
                )),
            ),
            (
                "approved".to_string(),
                FeelValue::DateTime(FeelDateTime::new(
                    NaiveDate::from_ymd_opt(2024, 3, 2).unwrap().and_time(clock(23, 59, 59, 125)),
                    FixedOffset::east_opt(0),
                )),
            ),
            (
                "band".to_string(),
                FeelValue::interval(true, FeelValue::Number(1.0), FeelValue::Number(10.0), false),
            ),
            (
                "history".to_string(),
                FeelValue::List(vec![
                    date(2023, 1, 1),
                    FeelValue::List(vec![FeelValue::from("nested")]),
                ]),
            ),
        ]
        .into_iter()
        .collect(),
    );

    let encoded = value_to_json(&value);
    assert_eq!(json_to_value(encoded), value);
}

#[test]
fn test_oversized_durations_stay_strings() {
    for text in [
        "@\"P99999999999999999D\"",
        "@\"P999999999999999999Y\"",
        "@\"PT9999999999999999H\"",
    ] {
        assert_eq!(json_to_value(json!(text)), FeelValue::String(text.to_string()));
    }
}

#[test]
fn test_deeply_nested_literal_stays_string() {
    let text = format!("@\"{}\"", "[".repeat(50_000));
    assert_eq!(json_to_value(json!(text.clone())), FeelValue::String(text));

    let brackets = "[".repeat(50_000);
    let variables = form_to_variables(vec![("band".to_string(), brackets.clone())]);
    assert_eq!(variables["band"], FeelValue::String(brackets));
}

#[test]
fn test_sub_millisecond_duration_round_trip() {
    let value = FeelValue::DayTimeDuration(TimeDelta::microseconds(1500));

    let encoded = value_to_json(&value);
    assert_eq!(encoded, json!("@\"P0DT0H0M0.0015S\""));
    assert_eq!(json_to_value(encoded), value);
}

#[test]
fn test_interval_with_temporal_endpoints() {
    let window = FeelValue::interval(true, date(2024, 1, 1), date(2024, 12, 31), true);

    let encoded = value_to_json(&window);
    assert_eq!(encoded, json!("@\"[@\"2024-01-01\" .. @\"2024-12-31\"]\""));
    assert_eq!(json_to_value(encoded), window);
}

#[test]
fn test_variables_conversion() {
    let obj = json!({"applicant age": 30, "start": "@\"2024-01-15\""});
    let serde_json::Value::Object(map) = obj else {
        panic!("Expected object");
    };

    let variables = json_to_variables(map);
    assert_eq!(variables["applicant age"], FeelValue::Number(30.0));
    assert_eq!(variables["start"], date(2024, 1, 15));

    let back = variables_to_json(&variables);
    assert_eq!(back, json!({"applicant age": 30, "start": "@\"2024-01-15\""}));
}

#[test]
fn test_form_to_variables() {
    let fields = vec![
        ("age".to_string(), "30".to_string()),
        ("member".to_string(), "true".to_string()),
        ("name".to_string(), "Ann Smith".to_string()),
        ("quoted".to_string(), "\"gold\"".to_string()),
        ("start".to_string(), "2024-01-15".to_string()),
        ("end".to_string(), "@\"2024-02-15\"".to_string()),
        ("empty".to_string(), "   ".to_string()),
    ];

    let variables = form_to_variables(fields);

    assert_eq!(variables["age"], FeelValue::Number(30.0));
    assert_eq!(variables["member"], FeelValue::Bool(true));
    assert_eq!(variables["name"], FeelValue::from("Ann Smith"));
    assert_eq!(variables["quoted"], FeelValue::from("gold"));
    assert_eq!(variables["start"], date(2024, 1, 15));
    assert_eq!(variables["end"], date(2024, 2, 15));
    assert!(!variables.contains_key("empty"));
}

#[test]
fn test_service_paths_are_encoded() {
    assert_eq!(service_path("Loan"), "/service/Loan");
    assert_eq!(service_path("Loan Approval"), "/service/Loan%20Approval");
    assert_eq!(
        table_path("Loan Approval", "Risk/Band"),
        "/service/Loan%20Approval/Risk%2FBand"
    );

    let links = ServiceLinks::new("Loan");
    assert_eq!(links.openapi_json, "/service/Loan/openapi.json");
    assert_eq!(links.openapi_yaml, "/service/Loan/openapi.yaml");
}
