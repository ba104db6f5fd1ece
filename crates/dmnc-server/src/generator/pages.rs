//! HTML pages for the browser UI
//!
//! Plain server-rendered markup; no scripts or static assets.

use super::listing::rule_listing;
use crate::api::rest::types::{service_path, table_path};
use dmnc_core::{DecisionTable, FeelType, GlossaryEntry, ServiceDefinition};
use dmnc_runtime::{ExecutedRule, Variables};
use std::fmt::Write;
use std::sync::Arc;

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <link rel=\"icon\" href=\"data:,\"></head>\n<body>\n{}\n\
         <p><a href=\"/\">Return to Decision Central</a></p>\n</body></html>\n",
        escape_html(title),
        body
    )
}

/// Catalog of services plus the upload form
pub fn catalog_page(services: &[Arc<ServiceDefinition>]) -> String {
    let mut body = String::from("<h1>Decision Central</h1>\n<h2>Decision services</h2>\n");

    if services.is_empty() {
        body.push_str("<p>No decision services have been uploaded.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for service in services {
            let _ = writeln!(
                body,
                "<li><a href=\"{}\">{}</a> ({} table{})</li>",
                escape_html(&service_path(service.name())),
                escape_html(service.name()),
                service.tables().len(),
                if service.tables().len() == 1 { "" } else { "s" }
            );
        }
        body.push_str("</ul>\n");
    }

    body.push_str(
        "<h2>Upload a DMN XML or YAML file</h2>\n\
         <form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <p><input type=\"file\" name=\"file\"></p>\n\
         <p><label>Service name <input type=\"text\" name=\"name\" placeholder=\"file name\"></label></p>\n\
         <p><label><input type=\"checkbox\" name=\"replace\" value=\"true\"> Replace an existing service</label></p>\n\
         <p><input type=\"submit\" value=\"Upload\"></p>\n\
         </form>\n\
         <p><a href=\"/upload/openapi.json\">OpenAPI description of the upload API</a></p>\n",
    );

    page("Decision Central", &body)
}

fn input_form(action: &str, entries: &[&GlossaryEntry]) -> String {
    let mut form = format!(
        "<form action=\"{}\" method=\"post\">\n<table>\n",
        escape_html(action)
    );
    for entry in entries {
        let _ = writeln!(
            form,
            "<tr><td>{}</td><td><input type=\"text\" name=\"{}\" placeholder=\"{}\"></td><td>{}</td></tr>",
            escape_html(&entry.name),
            escape_html(&entry.name),
            escape_html(placeholder(&entry.feel_type)),
            escape_html(entry.feel_type.as_str())
        );
    }
    form.push_str("</table>\n<p><input type=\"submit\" value=\"Make decision\"></p>\n</form>\n");
    form
}

fn placeholder(feel_type: &FeelType) -> &'static str {
    match feel_type {
        FeelType::Number => "42",
        FeelType::Boolean => "true",
        FeelType::Date => "2024-01-15",
        FeelType::Time => "10:30:00",
        FeelType::DateTime => "2024-01-15T10:30:00",
        FeelType::DayTimeDuration => "P1DT2H0M0S",
        FeelType::YearMonthDuration => "P1Y6M",
        FeelType::Range => "[1 .. 10]",
        FeelType::List => "[1, 2, 3]",
        _ => "",
    }
}

fn api_links(base: &str) -> String {
    format!(
        "<p>OpenAPI: <a href=\"{0}/openapi.json\">JSON</a> | <a href=\"{0}/openapi.yaml\">YAML</a></p>\n",
        escape_html(base)
    )
}

/// Glossary, decision sequence, tables and the whole-service input form
pub fn service_page(service: &ServiceDefinition) -> String {
    let name = service.name();
    let base = service_path(name);
    let mut body = format!("<h1>Decision service {}</h1>\n", escape_html(name));
    body.push_str(&api_links(&base));

    body.push_str("<h2>Glossary</h2>\n<table border=\"1\">\n<tr><th>Concept</th><th>Variable</th><th>Type</th></tr>\n");
    for (concept, entries) in service.glossary().by_concept() {
        for entry in entries {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(concept),
                escape_html(&entry.name),
                escape_html(entry.feel_type.as_str())
            );
        }
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Decision sequence</h2>\n<ol>\n");
    for table in service.sequence_tables() {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a> (hit policy {})</li>",
            escape_html(&table_path(name, &table.name)),
            escape_html(&table.name),
            table.hit_policy.code()
        );
    }
    body.push_str("</ol>\n");

    let unsequenced: Vec<&DecisionTable> = service
        .tables()
        .iter()
        .filter(|t| !service.sequence().contains(&t.name))
        .collect();
    if !unsequenced.is_empty() {
        body.push_str("<h2>Other decision tables</h2>\n<ul>\n");
        for table in unsequenced {
            let _ = writeln!(
                body,
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&table_path(name, &table.name)),
                escape_html(&table.name)
            );
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<h2>Make a decision</h2>\n");
    body.push_str(&input_form(&base, &service.input_entries(None)));

    let _ = write!(
        body,
        "<h2>Delete</h2>\n<form action=\"{}/delete\" method=\"post\">\
         <input type=\"submit\" value=\"Delete decision service {}\"></form>\n",
        escape_html(&base),
        escape_html(name)
    );

    page(&format!("Decision service {}", name), &body)
}

/// Rule listing and the single-table input form
pub fn table_page(service: &ServiceDefinition, table: &DecisionTable) -> String {
    let base = table_path(service.name(), &table.name);
    let mut body = format!(
        "<h1>Decision table {}</h1>\n<p>Part of <a href=\"{}\">{}</a></p>\n",
        escape_html(&table.name),
        escape_html(&service_path(service.name())),
        escape_html(service.name())
    );
    body.push_str(&api_links(&base));
    let _ = writeln!(body, "<pre>{}</pre>", escape_html(&rule_listing(table)));
    body.push_str("<h2>Make a decision</h2>\n");
    body.push_str(&input_form(&base, &service.input_entries(Some(&table.name))));

    page(&format!("Decision table {}", table.name), &body)
}

/// Outcome of a form-posted evaluation
pub fn result_page(
    service: &str,
    table: Option<&str>,
    inputs: &Variables,
    outcome: Result<(&Variables, &[ExecutedRule]), &[String]>,
) -> String {
    let target = match table {
        Some(table) => format!("{} / {}", service, table),
        None => service.to_string(),
    };
    let back = match table {
        Some(table) => table_path(service, table),
        None => service_path(service),
    };

    let mut body = format!("<h1>Decision from {}</h1>\n", escape_html(&target));
    body.push_str("<h2>Inputs</h2>\n");
    body.push_str(&variables_table(inputs));

    match outcome {
        Ok((outputs, executed)) => {
            body.push_str("<h2>Outputs</h2>\n");
            body.push_str(&variables_table(outputs));
            body.push_str("<h2>Executed rules</h2>\n<ul>\n");
            for rule in executed {
                let _ = writeln!(
                    body,
                    "<li>{} rule {}</li>",
                    escape_html(&rule.table),
                    escape_html(&rule.rule)
                );
            }
            body.push_str("</ul>\n");
        }
        Err(errors) => {
            body.push_str("<h2>Errors</h2>\n");
            for error in errors {
                let _ = writeln!(body, "<pre>{}</pre>", escape_html(error));
            }
        }
    }

    let _ = writeln!(
        body,
        "<p><a href=\"{}\">Make another decision</a></p>",
        escape_html(&back)
    );
    page(&format!("Decision from {}", target), &body)
}

fn variables_table(variables: &Variables) -> String {
    if variables.is_empty() {
        return "<p>(none)</p>\n".to_string();
    }
    let mut table = String::from("<table border=\"1\">\n");
    for (name, value) in variables {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(name),
            escape_html(&value.to_feel_literal())
        );
    }
    table.push_str("</table>\n");
    table
}

/// Short confirmation or failure page for UI actions
pub fn message_page(title: &str, message: &str) -> String {
    page(
        title,
        &format!(
            "<h1>{}</h1>\n<p>{}</p>\n",
            escape_html(title),
            escape_html(message)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnc_core::{FeelValue, SourceFormat};
    use dmnc_parser::{DmnLoader, ServiceLoader};

    fn service() -> ServiceDefinition {
        let yaml = r#"
glossary:
  - variable: age
    type: number
    concept: Applicant
tables:
  - name: "<Eligibility>"
    inputs: [age]
    outputs: [approved]
    rules:
      - when: ["< 18"]
        then: [false]
"#;
        DmnLoader::new()
            .load("Loan & Co", None, SourceFormat::Yaml, yaml.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_catalog_page_lists_services() {
        let page = catalog_page(&[Arc::new(service())]);
        assert!(page.contains("Loan &amp; Co"));
        assert!(page.contains("/service/Loan%20%26%20Co"));
        assert!(page.contains("enctype=\"multipart/form-data\""));
    }

    #[test]
    fn test_service_page_escapes_names() {
        let page = service_page(&service());
        assert!(page.contains("&lt;Eligibility&gt;"));
        assert!(!page.contains("<Eligibility>"));
        assert!(page.contains("name=\"age\""));
        assert!(page.contains("/delete\""));
    }

    #[test]
    fn test_table_page_includes_listing() {
        let service = service();
        let page = table_page(&service, &service.tables()[0]);
        assert!(page.contains("&lt; 18"));
        assert!(page.contains("<pre>"));
    }

    #[test]
    fn test_result_page() {
        let mut inputs = Variables::new();
        inputs.insert("age".to_string(), FeelValue::Number(12.0));
        let mut outputs = Variables::new();
        outputs.insert("approved".to_string(), FeelValue::Bool(false));
        let executed = vec![ExecutedRule {
            table: "Eligibility".to_string(),
            rule: "1".to_string(),
        }];

        let page = result_page("Loan", None, &inputs, Ok((&outputs, executed.as_slice())));
        assert!(page.contains("<td>approved</td><td>false</td>"));
        assert!(page.contains("Eligibility rule 1"));

        let errors = vec!["no rule matched".to_string()];
        let page = result_page("Loan", Some("Eligibility"), &inputs, Err(errors.as_slice()));
        assert!(page.contains("<pre>no rule matched</pre>"));
    }
}
