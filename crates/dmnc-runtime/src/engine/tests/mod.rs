//! Test modules for the decision table engine

mod hit_policies;

use dmnc_core::{FeelValue, ServiceDefinition, SourceFormat};
use dmnc_parser::{DmnLoader, ServiceLoader};

use super::Variables;

/// Load a YAML service file for a test
pub(super) fn service(yaml: &str) -> ServiceDefinition {
    DmnLoader::new()
        .load("Test", None, SourceFormat::Yaml, yaml.as_bytes())
        .unwrap()
}

pub(super) fn inputs(pairs: &[(&str, FeelValue)]) -> Variables {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
