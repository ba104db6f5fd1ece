//! Decision service definition

use super::glossary::{Glossary, GlossaryEntry, DEFAULT_CONCEPT};
use super::table::DecisionTable;
use crate::error::{CoreError, Result};
use crate::types::FeelType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Format of the uploaded artifact a service was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// DMN XML (`.dmn`, `.xml`)
    Xml,
    /// YAML service file (`.yaml`, `.yml`)
    Yaml,
    /// Spreadsheet workbook (`.xlsx`, `.xlsm`)
    Workbook,
}

impl SourceFormat {
    /// Select a format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "dmn" | "xml" => Some(SourceFormat::Xml),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            "xlsx" | "xlsm" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Xml => "xml",
            SourceFormat::Yaml => "yaml",
            SourceFormat::Workbook => "workbook",
        }
    }
}

/// Descriptor of the source artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    pub format: SourceFormat,
    pub file_name: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

impl SourceInfo {
    pub fn new(format: SourceFormat, file_name: Option<String>) -> Self {
        Self {
            format,
            file_name,
            loaded_at: Utc::now(),
        }
    }
}

/// One loaded decision service.
///
/// Built once by a loader and never modified afterwards; the registry
/// shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    name: String,
    glossary: Glossary,
    sequence: Vec<String>,
    tables: Vec<DecisionTable>,
    index: HashMap<String, usize>,
    source: SourceInfo,
}

impl ServiceDefinition {
    /// Build and validate a service definition.
    ///
    /// An empty `sequence` means every table, in declaration order. Table
    /// input and output names missing from the glossary are added with type
    /// `Any` under the default concept; for inputs these are the names the
    /// input expressions read.
    pub fn new(
        name: impl Into<String>,
        mut glossary: Glossary,
        sequence: Vec<String>,
        tables: Vec<DecisionTable>,
        source: SourceInfo,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(tables.len());
        for (position, table) in tables.iter().enumerate() {
            if index.insert(table.name.clone(), position).is_some() {
                return Err(CoreError::DuplicateTable(table.name.clone()));
            }
            table.validate()?;
        }

        let sequence = if sequence.is_empty() {
            tables.iter().map(|t| t.name.clone()).collect()
        } else {
            let mut seen = HashSet::new();
            for table_name in &sequence {
                if !index.contains_key(table_name) {
                    return Err(CoreError::UnknownTable(table_name.clone()));
                }
                if !seen.insert(table_name.as_str()) {
                    return Err(CoreError::InvalidValue(format!(
                        "Decision sequence lists '{}' twice",
                        table_name
                    )));
                }
            }
            sequence
        };

        for table in &tables {
            let read = table.inputs.iter().flat_map(|i| i.expression.parsed.names());
            for variable in read.chain(table.output_names()) {
                if !glossary.contains(variable) {
                    glossary.merge(GlossaryEntry::new(variable, FeelType::Any, DEFAULT_CONCEPT));
                }
            }
        }

        Ok(Self {
            name: name.into(),
            glossary,
            sequence,
            tables,
            index,
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    /// Decision sequence (table names, in execution order)
    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// Tables in declaration order
    pub fn tables(&self) -> &[DecisionTable] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&DecisionTable> {
        self.index.get(name).map(|&position| &self.tables[position])
    }

    /// Tables in decision-sequence order
    pub fn sequence_tables(&self) -> impl Iterator<Item = &DecisionTable> {
        self.sequence.iter().filter_map(|name| self.table(name))
    }

    /// Glossary entries a request may supply.
    ///
    /// Service level: every glossary entry. Table level: the variables the
    /// table's input expressions read.
    pub fn input_entries(&self, table: Option<&str>) -> Vec<&GlossaryEntry> {
        match table.and_then(|name| self.table(name)) {
            Some(table) => {
                let mut seen = HashSet::new();
                table
                    .inputs
                    .iter()
                    .flat_map(|i| i.expression.parsed.names())
                    .filter(|name| seen.insert(*name))
                    .filter_map(|name| self.glossary.get(name))
                    .collect()
            }
            None => self.glossary.iter().collect(),
        }
    }

    /// Glossary entries a response may carry.
    ///
    /// Service level: the outputs of every sequenced table, first occurrence
    /// wins. Table level: the table's outputs.
    pub fn output_entries(&self, table: Option<&str>) -> Vec<&GlossaryEntry> {
        let tables: Vec<&DecisionTable> = match table.and_then(|name| self.table(name)) {
            Some(table) => vec![table],
            None => self.sequence_tables().collect(),
        };

        let mut seen = HashSet::new();
        tables
            .into_iter()
            .flat_map(|t| t.output_names())
            .filter(|name| seen.insert(*name))
            .filter_map(|name| self.glossary.get(name))
            .collect()
    }
}
