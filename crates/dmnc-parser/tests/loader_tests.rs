//! Loader tests across formats
//!
//! Exercises the public `ServiceLoader` entry point the upload controller uses.

use dmnc_core::ast::{UnaryTest, UnaryTests};
use dmnc_core::{FeelValue, HitPolicy, SourceFormat};
use dmnc_parser::*;

// =============================================================================
// YAML
// =============================================================================

const DISCOUNTS: &str = r#"
glossary:
  - variable: Customer Tier
    type: string
    concept: Customer
  - variable: order date
    type: date
    concept: Order
tables:
  - name: Discount
    hit_policy: COLLECT
    aggregation: SUM
    inputs: [Customer Tier, order date]
    outputs: [discount]
    rules:
      - when: ['"gold", "platinum"', '>= @"2024-01-01"']
        then: [10]
      - when: ['not("bronze")', '-']
        then: [2.5]
"#;

#[test]
fn test_yaml_multi_word_names_and_collect_sum() {
    let service = DmnLoader::new()
        .load("Shop", Some("Shop.yml"), SourceFormat::Yaml, DISCOUNTS.as_bytes())
        .unwrap();

    let table = service.table("Discount").unwrap();
    assert_eq!(table.hit_policy.code(), "C+");
    assert_eq!(table.inputs[0].name, "Customer Tier");

    let UnaryTests::OneOf(tests) = &table.rules[0].inputs[1].parsed else {
        panic!("expected positive tests");
    };
    let UnaryTest::Compare(_, endpoint) = &tests[0] else {
        panic!("expected a comparison");
    };
    assert!(matches!(endpoint.as_constant(), Some(FeelValue::Date(_))));

    assert!(matches!(table.rules[1].inputs[0].parsed, UnaryTests::NoneOf(_)));
}

#[test]
fn test_yaml_syntax_error_registers_nothing() {
    let result = DmnLoader::new().load(
        "Broken",
        None,
        SourceFormat::Yaml,
        b"tables: [ {name: T, inputs: [a]",
    );
    assert!(matches!(result, Err(ParseError::YamlError(_))));
}

#[test]
fn test_yaml_bad_cell_is_a_parse_error() {
    let yaml = r#"
tables:
  - name: T
    inputs: [a]
    outputs: [b]
    rules:
      - when: ["[1 .. 5"]
        then: [1]
"#;
    let err = DmnLoader::new()
        .load("S", None, SourceFormat::Yaml, yaml.as_bytes())
        .unwrap_err();
    assert!(matches!(err, ParseError::InvalidCell { .. }));
}

// =============================================================================
// DMN XML
// =============================================================================

#[test]
fn test_xml_collect_with_aggregation_attribute() {
    let xml = r#"<?xml version="1.0"?>
<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/">
  <decision id="score" name="Score">
    <decisionTable hitPolicy="COLLECT" aggregation="COUNT">
      <input><inputExpression typeRef="number"><text>points</text></inputExpression></input>
      <output name="hits" typeRef="number"/>
      <rule><inputEntry><text>&gt; 10</text></inputEntry><outputEntry><text>1</text></outputEntry></rule>
      <rule><inputEntry><text>&gt; 20</text></inputEntry><outputEntry><text>1</text></outputEntry></rule>
    </decisionTable>
  </decision>
</definitions>"#;

    let service = DmnLoader::new()
        .load("Score", Some("Score.dmn"), SourceFormat::Xml, xml.as_bytes())
        .unwrap();
    let table = service.table("Score").unwrap();
    assert!(matches!(table.hit_policy, HitPolicy::Collect(Some(_))));
    assert_eq!(table.hit_policy.code(), "C#");
    assert_eq!(service.source().file_name.as_deref(), Some("Score.dmn"));
}

#[test]
fn test_xml_priority_rejected() {
    let xml = r#"<definitions><decision id="d" name="D">
        <decisionTable hitPolicy="PRIORITY">
          <input><inputExpression><text>x</text></inputExpression></input>
          <output name="y"/>
        </decisionTable></decision></definitions>"#;
    let err = DmnLoader::new()
        .load("S", None, SourceFormat::Xml, xml.as_bytes())
        .unwrap_err();
    assert!(matches!(err, ParseError::InvalidService(_)));
}

#[test]
fn test_xml_rule_with_missing_cells() {
    let xml = r#"<definitions><decision id="d" name="D">
        <decisionTable>
          <input><inputExpression><text>x</text></inputExpression></input>
          <input><inputExpression><text>z</text></inputExpression></input>
          <output name="y"/>
          <rule><inputEntry><text>1</text></inputEntry><outputEntry><text>2</text></outputEntry></rule>
        </decisionTable></decision></definitions>"#;
    let err = DmnLoader::new()
        .load("S", None, SourceFormat::Xml, xml.as_bytes())
        .unwrap_err();
    assert!(err.to_string().contains("expected 2 input entries"));
}

// =============================================================================
// FEEL literals
// =============================================================================

#[test]
fn test_parse_literal_round_trips_rendering() {
    for text in [
        "@\"2024-01-15\"",
        "@\"10:30:00\"",
        "@\"2024-01-15T10:30:00+01:00\"",
        "@\"P1DT2H0M0S\"",
        "@\"-P1Y6M\"",
        "[1 .. 10)",
        "(@\"2024-01-01\" .. @\"2024-12-31\"]",
        "[1, \"two\", true, null]",
    ] {
        let value = FeelParser::parse_literal(text).unwrap();
        let rendered = value.to_feel_literal();
        assert_eq!(FeelParser::parse_literal(&rendered).unwrap(), value, "{}", text);
    }
}
