//! Hit policy tests

use super::{inputs, service};
use crate::engine::{DecisionEvaluator, DmnEngine};
use crate::error::EvaluationError;
use dmnc_core::FeelValue;

fn table_yaml(hit_policy: &str) -> String {
    format!(
        r#"
tables:
  - name: Score
    hit_policy: "{}"
    inputs: [points]
    outputs: [bonus]
    rules:
      - id: low
        when: ["> 10"]
        then: [1]
      - id: mid
        when: ["> 20"]
        then: [5]
      - id: high
        when: ["> 30"]
        then: [5]
"#,
        hit_policy
    )
}

fn run(hit_policy: &str, points: f64) -> crate::Result<crate::TableOutcome> {
    let service = service(&table_yaml(hit_policy));
    let table = service.table("Score").unwrap();
    DmnEngine::new().evaluate_table(table, &inputs(&[("points", FeelValue::Number(points))]))
}

#[test]
fn test_unique_single_match() {
    let outcome = run("U", 15.0).unwrap();
    assert_eq!(outcome.outputs["bonus"], FeelValue::Number(1.0));
    assert_eq!(outcome.matched, vec!["low".to_string()]);
}

#[test]
fn test_unique_multiple_matches_is_an_error() {
    let err = run("U", 25.0).unwrap_err();
    assert_eq!(
        err,
        EvaluationError::MultipleMatches {
            table: "Score".to_string(),
            rules: vec!["low".to_string(), "mid".to_string()],
        }
    );
}

#[test]
fn test_single_hit_without_match_is_an_error() {
    for policy in ["U", "A", "F"] {
        assert!(matches!(run(policy, 5.0), Err(EvaluationError::NoMatch { .. })));
    }
}

#[test]
fn test_any_requires_agreeing_outputs() {
    let err = run("A", 25.0).unwrap_err();
    assert!(matches!(err, EvaluationError::ConflictingOutputs { .. }));

    let yaml = r#"
tables:
  - name: Score
    hit_policy: A
    inputs: [points]
    outputs: [bonus]
    rules:
      - when: ["> 20"]
        then: [5]
      - when: ["> 30"]
        then: [5]
"#;
    let service = service(yaml);
    let outcome = DmnEngine::new()
        .evaluate_table(
            service.table("Score").unwrap(),
            &inputs(&[("points", FeelValue::Number(35.0))]),
        )
        .unwrap();
    assert_eq!(outcome.outputs["bonus"], FeelValue::Number(5.0));
}

#[test]
fn test_first_stops_at_first_match() {
    let outcome = run("F", 35.0).unwrap();
    assert_eq!(outcome.outputs["bonus"], FeelValue::Number(1.0));
    assert_eq!(outcome.matched.len(), 1);
}

#[test]
fn test_rule_order_and_collect_return_lists() {
    for policy in ["R", "C"] {
        let outcome = run(policy, 35.0).unwrap();
        assert_eq!(
            outcome.outputs["bonus"],
            FeelValue::List(vec![
                FeelValue::Number(1.0),
                FeelValue::Number(5.0),
                FeelValue::Number(5.0)
            ])
        );
    }
    assert_eq!(run("R", 0.0).unwrap().outputs["bonus"], FeelValue::List(vec![]));
}

#[test]
fn test_collect_aggregations() {
    assert_eq!(run("C+", 35.0).unwrap().outputs["bonus"], FeelValue::Number(11.0));
    assert_eq!(run("C#", 35.0).unwrap().outputs["bonus"], FeelValue::Number(3.0));
    assert_eq!(run("C<", 35.0).unwrap().outputs["bonus"], FeelValue::Number(1.0));
    assert_eq!(run("C>", 35.0).unwrap().outputs["bonus"], FeelValue::Number(5.0));
    assert_eq!(run("C+", 0.0).unwrap().outputs["bonus"], FeelValue::Null);
    assert_eq!(run("C#", 0.0).unwrap().outputs["bonus"], FeelValue::Number(0.0));
}

#[test]
fn test_null_input_skips_comparisons() {
    let service = service(&table_yaml("C#"));
    let outcome = DmnEngine::new()
        .evaluate_table(service.table("Score").unwrap(), &inputs(&[]))
        .unwrap();
    assert_eq!(outcome.outputs["bonus"], FeelValue::Number(0.0));
}

#[test]
fn test_incompatible_input_kind_names_the_rule() {
    let service = service(&table_yaml("U"));
    let err = DmnEngine::new()
        .evaluate_table(
            service.table("Score").unwrap(),
            &inputs(&[("points", FeelValue::from("many"))]),
        )
        .unwrap_err();
    assert!(matches!(err, EvaluationError::InRule { ref rule, .. } if rule == "low"));
}
