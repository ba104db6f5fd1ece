//! YAML service file loader
//!
//! ```yaml
//! glossary:
//!   - variable: age
//!     type: number
//!     concept: Applicant
//! sequence: [Eligibility]
//! tables:
//!   - name: Eligibility
//!     hit_policy: U
//!     inputs: [age]
//!     outputs: [approved]
//!     rules:
//!       - when: [">= 18"]
//!         then: [true]
//!         annotation: adult
//! ```
//!
//! Cells are FEEL text; plain YAML numbers and booleans are accepted as
//! their FEEL spelling.

use super::{RawRule, RawTable};
use crate::error::{ParseError, Result};
use dmnc_core::ast::glossary::DEFAULT_CONCEPT;
use dmnc_core::{
    FeelType, Glossary, GlossaryEntry, ServiceDefinition, SourceFormat, SourceInfo,
};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceFile {
    #[serde(default)]
    glossary: Vec<GlossaryItem>,
    #[serde(default)]
    sequence: Vec<String>,
    tables: Vec<TableItem>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GlossaryItem {
    variable: String,
    #[serde(rename = "type", default)]
    feel_type: Option<String>,
    #[serde(default)]
    concept: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableItem {
    name: String,
    #[serde(default)]
    hit_policy: Option<String>,
    #[serde(default)]
    aggregation: Option<String>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    #[serde(default)]
    rules: Vec<RuleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    when: Vec<YamlValue>,
    then: Vec<YamlValue>,
    #[serde(default)]
    annotation: Option<String>,
}

pub(super) fn load(name: &str, file_name: Option<&str>, text: &str) -> Result<ServiceDefinition> {
    let file: ServiceFile = serde_yaml::from_str(text)?;

    let glossary: Glossary = file
        .glossary
        .into_iter()
        .map(|item| {
            GlossaryEntry::new(
                item.variable,
                FeelType::parse(item.feel_type.as_deref().unwrap_or("")),
                item.concept.unwrap_or_else(|| DEFAULT_CONCEPT.to_string()),
            )
        })
        .collect();

    let tables = file
        .tables
        .into_iter()
        .map(|table| {
            let rules = table
                .rules
                .into_iter()
                .enumerate()
                .map(|(index, rule)| {
                    Ok(RawRule {
                        id: rule.id.unwrap_or_else(|| (index + 1).to_string()),
                        inputs: rule.when.iter().map(cell_text).collect::<Result<_>>()?,
                        outputs: rule.then.iter().map(cell_text).collect::<Result<_>>()?,
                        annotation: rule.annotation,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            RawTable {
                name: table.name,
                hit_policy: table.hit_policy.unwrap_or_default(),
                aggregation: table.aggregation,
                inputs: table
                    .inputs
                    .into_iter()
                    .map(|text| (String::new(), text))
                    .collect(),
                outputs: table.outputs,
                rules,
            }
            .build()
        })
        .collect::<Result<Vec<_>>>()?;

    let source = SourceInfo::new(SourceFormat::Yaml, file_name.map(str::to_string));
    Ok(ServiceDefinition::new(
        name,
        glossary,
        file.sequence,
        tables,
        source,
    )?)
}

/// FEEL source text of a YAML cell
fn cell_text(value: &YamlValue) -> Result<String> {
    match value {
        YamlValue::Null => Ok("-".to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::String(s) => Ok(s.clone()),
        other => Err(ParseError::InvalidValue {
            field: "rule cell".to_string(),
            message: format!("expected a scalar, found {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnc_core::HitPolicy;

    const LOAN: &str = r#"
glossary:
  - variable: age
    type: number
    concept: Applicant
  - variable: income
    type: number
    concept: Applicant
  - variable: approved
    type: boolean
    concept: Decision
tables:
  - name: Eligibility
    hit_policy: U
    inputs: [age, income]
    outputs: [approved]
    rules:
      - when: [">= 18", ">= 1000"]
        then: [true]
        annotation: adult with income
      - when: ["< 18", "-"]
        then: [false]
      - when: [">= 18", "< 1000"]
        then: [false]
"#;

    #[test]
    fn test_load_yaml_service() {
        let service = load("Loan", Some("Loan.yaml"), LOAN).unwrap();
        let table = service.table("Eligibility").unwrap();

        assert_eq!(table.hit_policy, HitPolicy::Unique);
        assert_eq!(table.rules.len(), 3);
        assert_eq!(table.rules[0].id, "1");
        assert_eq!(table.rules[0].outputs[0].text, "true");
        assert_eq!(service.source().format, SourceFormat::Yaml);
        assert_eq!(service.glossary().get("approved").unwrap().concept, "Decision");
    }

    #[test]
    fn test_unknown_sequence_table() {
        let yaml = r#"
sequence: [Missing]
tables:
  - name: T
    inputs: [a]
    outputs: [b]
"#;
        assert!(matches!(
            load("S", None, yaml),
            Err(ParseError::InvalidService(_))
        ));
    }

    #[test]
    fn test_unsupported_hit_policy() {
        let yaml = r#"
tables:
  - name: T
    hit_policy: P
    inputs: [a]
    outputs: [b]
"#;
        let err = load("S", None, yaml).unwrap_err();
        assert!(err.to_string().contains("Unsupported hit policy"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "tables: []\nextra: 1\n";
        assert!(matches!(load("S", None, yaml), Err(ParseError::YamlError(_))));
    }
}
