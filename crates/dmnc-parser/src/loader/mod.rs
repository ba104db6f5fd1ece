//! Service loaders
//!
//! A loader turns the bytes of an uploaded rule file into a validated
//! `ServiceDefinition`. Nothing is returned unless the whole file parses.

mod xml;
mod yaml;

use crate::error::{ParseError, Result};
use crate::feel::FeelParser;
use dmnc_core::ast::{Cell, DecisionTable, Expr, HitPolicy, Rule, TableInput, TableOutput};
use dmnc_core::{FeelValue, ServiceDefinition, SourceFormat};

/// Builds service definitions from uploaded files
pub trait ServiceLoader: Send + Sync {
    /// Parse `bytes` in the given format into a service called `name`
    fn load(
        &self,
        name: &str,
        file_name: Option<&str>,
        format: SourceFormat,
        bytes: &[u8],
    ) -> Result<ServiceDefinition>;
}

/// Loader for DMN XML and YAML service files
#[derive(Debug, Clone, Copy, Default)]
pub struct DmnLoader;

impl DmnLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceLoader for DmnLoader {
    fn load(
        &self,
        name: &str,
        file_name: Option<&str>,
        format: SourceFormat,
        bytes: &[u8],
    ) -> Result<ServiceDefinition> {
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidValue {
            field: "file".to_string(),
            message: format!("not valid UTF-8: {}", e),
        })?;
        let text = text.trim_start_matches('\u{feff}');

        let service = match format {
            SourceFormat::Xml => xml::load(name, file_name, text)?,
            SourceFormat::Yaml => yaml::load(name, file_name, text)?,
            SourceFormat::Workbook => {
                return Err(ParseError::UnsupportedFormat(
                    "spreadsheet workbooks cannot be read; upload DMN XML or YAML".to_string(),
                ))
            }
        };

        tracing::debug!(
            service = %service.name(),
            tables = service.tables().len(),
            glossary = service.glossary().len(),
            "Parsed decision service"
        );
        Ok(service)
    }
}

/// A table as read from a source file, before its cells are parsed
#[derive(Debug, Default)]
struct RawTable {
    name: String,
    hit_policy: String,
    aggregation: Option<String>,
    /// (column label, input expression)
    inputs: Vec<(String, String)>,
    outputs: Vec<String>,
    rules: Vec<RawRule>,
}

#[derive(Debug, Default)]
struct RawRule {
    id: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    annotation: Option<String>,
}

impl RawTable {
    /// Parse every cell and build the table
    fn build(self) -> Result<DecisionTable> {
        let hit_policy = HitPolicy::parse(&self.hit_policy, self.aggregation.as_deref())?;
        let table_name = self.name;

        let inputs = self
            .inputs
            .into_iter()
            .map(|(label, text)| {
                let parsed = FeelParser::parse_expression(&text).map_err(|e| {
                    ParseError::InvalidCell {
                        table: table_name.clone(),
                        rule: "input expression".to_string(),
                        text: text.clone(),
                        message: e.to_string(),
                    }
                })?;
                let name = if label.is_empty() { text.clone() } else { label };
                Ok(TableInput {
                    name,
                    expression: Cell::new(text, parsed),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs = self
            .outputs
            .into_iter()
            .map(|name| TableOutput { name })
            .collect();

        let rules = self
            .rules
            .into_iter()
            .map(|raw| {
                let cell_error = |text: &str, e: ParseError| ParseError::InvalidCell {
                    table: table_name.clone(),
                    rule: raw.id.clone(),
                    text: text.to_string(),
                    message: e.to_string(),
                };
                let inputs = raw
                    .inputs
                    .iter()
                    .map(|text| {
                        FeelParser::parse_unary_tests(text)
                            .map(|tests| Cell::new(text.trim(), tests))
                            .map_err(|e| cell_error(text, e))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let outputs = raw
                    .outputs
                    .iter()
                    .map(|text| parse_output_entry(text).map_err(|e| cell_error(text, e)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Rule {
                    id: raw.id.clone(),
                    inputs,
                    outputs,
                    annotation: raw.annotation.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DecisionTable {
            name: table_name,
            hit_policy,
            inputs,
            outputs,
            rules,
        })
    }
}

/// An empty output entry yields null
fn parse_output_entry(text: &str) -> Result<Cell<Expr>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(Cell::new(trimmed, Expr::Literal(FeelValue::Null)));
    }
    FeelParser::parse_expression(trimmed).map(|expr| Cell::new(trimmed, expr))
}
