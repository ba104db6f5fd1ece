//! OpenAPI 3.0 documents for decision services and the upload endpoint

use crate::api::rest::types::{service_path, table_path};
use axum::http::HeaderMap;
use dmnc_core::{FeelType, GlossaryEntry, ServiceDefinition};
use serde_json::{json, Map, Value};

const OPENAPI_VERSION: &str = "3.0.0";

/// Base URL of the server as the client sees it.
///
/// `X-Forwarded-Proto` + `X-Forwarded-Host` win over `Host`.
pub fn server_url(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    match (header("x-forwarded-proto"), header("x-forwarded-host")) {
        (Some(proto), Some(host)) => Some(format!("{}://{}", proto, host)),
        _ => header("host").map(|host| format!("http://{}", host)),
    }
}

/// JSON Schema of one FEEL type
fn type_schema(feel_type: &FeelType) -> Value {
    match feel_type {
        FeelType::String => json!({"type": "string"}),
        FeelType::Number => json!({"type": "number"}),
        FeelType::Boolean => json!({"type": "boolean"}),
        FeelType::Date => temporal_schema("date", "@\"2024-01-15\""),
        FeelType::Time => temporal_schema("time", "@\"10:30:00\""),
        FeelType::DateTime => temporal_schema("date-time", "@\"2024-01-15T10:30:00+01:00\""),
        FeelType::DayTimeDuration => temporal_schema("duration", "@\"P1DT2H0M0S\""),
        FeelType::YearMonthDuration => temporal_schema("duration", "@\"P1Y6M\""),
        FeelType::Range => temporal_schema("range", "@\"[1 .. 10)\""),
        FeelType::List => json!({"type": "array", "items": {}}),
        FeelType::Context => json!({"type": "object"}),
        FeelType::Any | FeelType::Other(_) => json!({"type": "string"}),
    }
}

fn temporal_schema(format: &str, example: &str) -> Value {
    json!({
        "type": "string",
        "format": format,
        "description": format!(
            "FEEL {} value written as @\"<literal>\", e.g. {}",
            format, example
        ),
        "example": example,
    })
}

fn object_schema(entries: &[&GlossaryEntry]) -> Value {
    let properties: Map<String, Value> = entries
        .iter()
        .map(|entry| {
            let mut schema = type_schema(&entry.feel_type);
            if let Value::Object(fields) = &mut schema {
                fields.insert("nullable".to_string(), Value::Bool(true));
                fields
                    .entry("description".to_string())
                    .or_insert_with(|| Value::String(entry.concept.clone()));
            }
            (entry.name.clone(), schema)
        })
        .collect();

    json!({
        "type": "object",
        "properties": properties,
    })
}

fn error_schemas() -> Value {
    json!({
        "Error": {
            "type": "object",
            "required": ["error", "kind", "status"],
            "properties": {
                "error": {"type": "string"},
                "kind": {"type": "string"},
                "status": {"type": "integer"},
            },
        },
        "RuleErrors": {
            "type": "object",
            "required": ["result", "errors", "kind", "status"],
            "properties": {
                "result": {"type": "object"},
                "errors": {"type": "array", "items": {"type": "string"}},
                "kind": {"type": "string", "enum": ["RuleEvaluationError"]},
                "status": {"type": "integer"},
            },
        },
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {"$ref": "#/components/schemas/Error"}
            }
        },
    })
}

fn operation_id(parts: &[&str]) -> String {
    let mut id = String::from("decide");
    for part in parts {
        id.push('_');
        id.extend(
            part.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
        );
    }
    id
}

fn with_servers(mut document: Value, server: Option<&str>) -> Value {
    if let (Some(url), Value::Object(fields)) = (server, &mut document) {
        fields.insert("servers".to_string(), json!([{ "url": url }]));
    }
    document
}

/// Document for the service-level endpoint, or one table's endpoint
pub fn service_document(
    service: &ServiceDefinition,
    table: Option<&str>,
    server: Option<&str>,
) -> Value {
    let (path, title, summary, id) = match table {
        Some(table) => (
            table_path(service.name(), table),
            format!("{} / {}", service.name(), table),
            format!("Evaluate decision table '{}'", table),
            operation_id(&[service.name(), table]),
        ),
        None => (
            service_path(service.name()),
            service.name().to_string(),
            format!(
                "Evaluate decision service '{}' ({})",
                service.name(),
                service.sequence().join(" -> ")
            ),
            operation_id(&[service.name()]),
        ),
    };

    let inputs = service.input_entries(table);
    let outputs = service.output_entries(table);

    let mut schemas = Map::new();
    schemas.insert("Inputs".to_string(), object_schema(&inputs));
    schemas.insert("Outputs".to_string(), object_schema(&outputs));
    if let Value::Object(errors) = error_schemas() {
        schemas.extend(errors);
    }

    let mut paths = Map::new();
    paths.insert(
        path,
        json!({
            "post": {
                "summary": summary,
                "operationId": id,
                "parameters": [{
                    "name": "trace",
                    "in": "query",
                    "required": false,
                    "description": "Return the executed rules alongside the result",
                    "schema": {"type": "boolean"},
                }],
                "requestBody": {
                    "required": true,
                    "content": {
                        "application/json": {
                            "schema": {"$ref": "#/components/schemas/Inputs"}
                        }
                    },
                },
                "responses": {
                    "200": {
                        "description": "Decision outputs, or the rule evaluation errors",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "oneOf": [
                                        {"$ref": "#/components/schemas/Outputs"},
                                        {"$ref": "#/components/schemas/RuleErrors"},
                                    ]
                                }
                            }
                        },
                    },
                    "400": error_response("Request body is not a JSON object"),
                    "404": error_response("Unknown decision service or table"),
                    "504": error_response("Evaluation did not finish in time"),
                },
            }
        }),
    );

    let document = json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": format!("{} decision service", title),
            "version": "1.0.0",
        },
        "paths": paths,
        "components": {"schemas": schemas},
    });
    with_servers(document, server)
}

/// Document for `POST /upload` and `DELETE /service/{name}`
pub fn upload_document(server: Option<&str>) -> Value {
    let mut schemas = Map::new();
    schemas.insert(
        "Upload".to_string(),
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "status": {"type": "string", "enum": ["created", "replaced"]},
                "tables": {"type": "array", "items": {"type": "string"}},
                "links": {"type": "object"},
            },
        }),
    );
    if let Value::Object(errors) = error_schemas() {
        schemas.extend(errors);
    }

    let document = json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "Decision Central file upload",
            "version": "1.0.0",
        },
        "paths": {
            "/upload": {
                "post": {
                    "summary": "Create a decision service from a DMN XML or YAML file",
                    "operationId": "upload",
                    "parameters": [{
                        "name": "replace",
                        "in": "query",
                        "required": false,
                        "schema": {"type": "boolean"},
                    }],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "multipart/form-data": {
                                "schema": {
                                    "type": "object",
                                    "required": ["file"],
                                    "properties": {
                                        "file": {"type": "string", "format": "binary"},
                                        "name": {"type": "string"},
                                        "replace": {"type": "boolean"},
                                    },
                                }
                            }
                        },
                    },
                    "responses": {
                        "201": {
                            "description": "Decision service created",
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/Upload"}
                                }
                            },
                        },
                        "200": {
                            "description": "Decision service replaced",
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/Upload"}
                                }
                            },
                        },
                        "400": error_response("Missing file, bad extension or unparseable file"),
                        "409": error_response("A decision service with this name exists"),
                    },
                }
            },
            "/service/{name}": {
                "delete": {
                    "summary": "Delete a decision service",
                    "operationId": "delete",
                    "parameters": [{
                        "name": "name",
                        "in": "path",
                        "required": true,
                        "schema": {"type": "string"},
                    }],
                    "responses": {
                        "200": {"description": "Decision service deleted"},
                        "404": error_response("Unknown decision service"),
                    },
                }
            },
        },
        "components": {"schemas": schemas},
    });
    with_servers(document, server)
}

/// YAML rendering of a document
pub fn to_yaml(document: &Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(document)
}
