//! DMN XML loader

use super::{RawRule, RawTable};
use crate::error::{ParseError, Result};
use crate::feel::FeelParser;
use dmnc_core::ast::glossary::DEFAULT_CONCEPT;
use dmnc_core::ast::Expr;
use dmnc_core::{
    FeelType, Glossary, GlossaryEntry, ServiceDefinition, SourceFormat, SourceInfo,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{HashMap, HashSet};

/// Minimal element tree; namespaces are dropped
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| ParseError::XmlError(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Contents of the `<text>` child, or empty
    fn text_child(&self) -> String {
        self.child("text")
            .map(|t| t.text.trim().to_string())
            .unwrap_or_default()
    }
}

/// Deepest element nesting accepted in a document
const MAX_ELEMENT_DEPTH: usize = 256;

fn parse_document(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(ParseError::XmlError(format!(
                        "Elements nested deeper than {} levels",
                        MAX_ELEMENT_DEPTH
                    )));
                }
                stack.push(Element::from_start(&start)?)
            }
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::XmlError("Unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::XmlError("Unexpected end of document".to_string()));
    }
    root.ok_or_else(|| ParseError::XmlError("Empty document".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Load a DMN 1.x `definitions` document
pub(super) fn load(name: &str, file_name: Option<&str>, text: &str) -> Result<ServiceDefinition> {
    let root = parse_document(text)?;
    if root.name != "definitions" {
        return Err(ParseError::InvalidValue {
            field: "root".to_string(),
            message: format!("expected a DMN <definitions> element, found <{}>", root.name),
        });
    }

    let mut glossary = Glossary::new();
    for input in root.children("inputData") {
        let variable = input.child("variable");
        let Some(var_name) = variable
            .and_then(|v| v.attr("name"))
            .or_else(|| input.attr("name"))
        else {
            return Err(ParseError::MissingField {
                field: "inputData@name".to_string(),
            });
        };
        let feel_type = FeelType::parse(variable.and_then(|v| v.attr("typeRef")).unwrap_or(""));
        let concept = input.attr("label").unwrap_or(DEFAULT_CONCEPT);
        glossary.merge(GlossaryEntry::new(var_name, feel_type, concept));
    }

    let mut decisions = Vec::new();
    for decision in root.children("decision") {
        let decision_name = decision
            .attr("name")
            .ok_or_else(|| ParseError::MissingField {
                field: "decision@name".to_string(),
            })?;
        let Some(table) = decision.child("decisionTable") else {
            tracing::warn!(decision = %decision_name, "Skipping decision without a decision table");
            continue;
        };
        let raw = read_table(decision_name, decision.attr("label"), table, &mut glossary)?;
        let requires = decision
            .children("informationRequirement")
            .filter_map(|req| req.child("requiredDecision"))
            .filter_map(|req| req.attr("href"))
            .map(|href| href.trim_start_matches('#').to_string())
            .collect::<Vec<_>>();
        decisions.push(DecisionNode {
            id: decision.attr("id").unwrap_or(decision_name).to_string(),
            requires,
            raw,
        });
    }

    let order = dependency_order(&decisions)?;
    let sequence = order
        .iter()
        .map(|&index| decisions[index].raw.name.clone())
        .collect();
    let tables = decisions
        .into_iter()
        .map(|node| node.raw.build())
        .collect::<Result<Vec<_>>>()?;

    let source = SourceInfo::new(SourceFormat::Xml, file_name.map(str::to_string));
    Ok(ServiceDefinition::new(name, glossary, sequence, tables, source)?)
}

struct DecisionNode {
    id: String,
    requires: Vec<String>,
    raw: RawTable,
}

fn read_table(
    decision_name: &str,
    label: Option<&str>,
    table: &Element,
    glossary: &mut Glossary,
) -> Result<RawTable> {
    let mut raw = RawTable {
        name: decision_name.to_string(),
        hit_policy: table.attr("hitPolicy").unwrap_or("UNIQUE").to_string(),
        aggregation: table.attr("aggregation").map(str::to_string),
        ..Default::default()
    };

    for input in table.children("input") {
        let expression = input.child("inputExpression");
        let text = expression.map(Element::text_child).unwrap_or_default();
        if text.is_empty() {
            return Err(ParseError::MissingField {
                field: format!("{}: inputExpression/text", decision_name),
            });
        }
        // A bare variable reference carries its type into the glossary
        if let Ok(Expr::Name(variable)) = FeelParser::parse_expression(&text) {
            let feel_type = FeelType::parse(expression.and_then(|e| e.attr("typeRef")).unwrap_or(""));
            glossary.merge(GlossaryEntry::new(variable, feel_type, DEFAULT_CONCEPT));
        }
        raw.inputs
            .push((input.attr("label").unwrap_or_default().to_string(), text));
    }

    let outputs: Vec<&Element> = table.children("output").collect();
    for output in &outputs {
        let output_name = match output.attr("name") {
            Some(n) if !n.is_empty() => n,
            _ if outputs.len() == 1 => decision_name,
            _ => {
                return Err(ParseError::MissingField {
                    field: format!("{}: output@name", decision_name),
                })
            }
        };
        let feel_type = FeelType::parse(output.attr("typeRef").unwrap_or(""));
        glossary.merge(GlossaryEntry::new(
            output_name,
            feel_type,
            label.unwrap_or(decision_name),
        ));
        raw.outputs.push(output_name.to_string());
    }

    for (index, rule) in table.children("rule").enumerate() {
        let annotation = rule
            .children("annotationEntry")
            .map(Element::text_child)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>();
        raw.rules.push(RawRule {
            id: rule
                .attr("id")
                .map(str::to_string)
                .unwrap_or_else(|| (index + 1).to_string()),
            inputs: rule.children("inputEntry").map(Element::text_child).collect(),
            outputs: rule.children("outputEntry").map(Element::text_child).collect(),
            annotation: (!annotation.is_empty()).then(|| annotation.join("; ")),
        });
    }

    Ok(raw)
}

/// Document order, moved so each decision follows the decisions it requires
fn dependency_order(decisions: &[DecisionNode]) -> Result<Vec<usize>> {
    let by_id: HashMap<&str, usize> = decisions
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect();

    let mut order = Vec::with_capacity(decisions.len());
    let mut done = HashSet::new();
    let mut visiting = HashSet::new();

    fn visit(
        index: usize,
        decisions: &[DecisionNode],
        by_id: &HashMap<&str, usize>,
        done: &mut HashSet<usize>,
        visiting: &mut HashSet<usize>,
        order: &mut Vec<usize>,
    ) -> Result<()> {
        if done.contains(&index) {
            return Ok(());
        }
        if !visiting.insert(index) {
            return Err(ParseError::InvalidValue {
                field: "requiredDecision".to_string(),
                message: format!("cycle through decision '{}'", decisions[index].raw.name),
            });
        }
        // requirements on decisions without tables are ignored
        for required in &decisions[index].requires {
            if let Some(&dependency) = by_id.get(required.as_str()) {
                visit(dependency, decisions, by_id, done, visiting, order)?;
            }
        }
        visiting.remove(&index);
        done.insert(index);
        order.push(index);
        Ok(())
    }

    for index in 0..decisions.len() {
        visit(index, decisions, &by_id, &mut done, &mut visiting, &mut order)?;
    }
    Ok(order)
}
