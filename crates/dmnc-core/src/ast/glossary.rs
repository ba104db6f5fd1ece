//! Glossary: the variables a decision service reads and produces

use crate::types::FeelType;
use serde::Serialize;

/// Concept used when a source does not group variables
pub const DEFAULT_CONCEPT: &str = "Data";

/// One glossary variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlossaryEntry {
    /// Variable name as used in requests and responses
    pub name: String,

    /// Declared FEEL type
    #[serde(rename = "type")]
    pub feel_type: FeelType,

    /// Business concept (label) the variable belongs to
    pub concept: String,
}

impl GlossaryEntry {
    pub fn new(name: impl Into<String>, feel_type: FeelType, concept: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feel_type,
            concept: concept.into(),
        }
    }
}

/// Ordered glossary; names are unique
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, or refine an existing one.
    ///
    /// The first declaration of a name wins, except that a declared type
    /// replaces `Any`.
    pub fn merge(&mut self, entry: GlossaryEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => {
                if existing.feel_type == FeelType::Any {
                    existing.feel_type = entry.feel_type;
                }
            }
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&GlossaryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlossaryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped by concept, concepts in first-appearance order
    pub fn by_concept(&self) -> Vec<(&str, Vec<&GlossaryEntry>)> {
        let mut groups: Vec<(&str, Vec<&GlossaryEntry>)> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|(concept, _)| *concept == entry.concept) {
                Some((_, members)) => members.push(entry),
                None => groups.push((entry.concept.as_str(), vec![entry])),
            }
        }
        groups
    }
}

impl FromIterator<GlossaryEntry> for Glossary {
    fn from_iter<I: IntoIterator<Item = GlossaryEntry>>(iter: I) -> Self {
        let mut glossary = Glossary::new();
        for entry in iter {
            glossary.merge(entry);
        }
        glossary
    }
}
