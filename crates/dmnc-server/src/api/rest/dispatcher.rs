//! Dynamic dispatch of `/service/...` requests
//!
//! Services come and go at runtime, so nothing is registered with the
//! router per service. Every request under `/service` lands here; the path
//! is split into percent-decoded segments and resolved against the
//! registry on each call:
//!
//! ```text
//! /service/{name}                      GET page, POST evaluate, DELETE
//! /service/{name}/openapi.json|yaml    GET service document
//! /service/{name}/delete               POST (HTML form delete)
//! /service/{name}/{table}              GET page, POST evaluate
//! /service/{name}/{table}/openapi.json|yaml
//! ```

use super::conversions::variables_to_json;
use super::extractors::{wants_json, EvaluationBody};
use super::types::*;
use crate::error::ServerError;
use crate::generator::{openapi, pages, rule_listing};
use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header, HeaderMap, Method},
    response::{Html, IntoResponse, Response},
    Json,
};
use dmnc_core::ServiceDefinition;
use dmnc_runtime::{Decision, Variables};
use std::sync::Arc;
use tracing::{debug, info};

/// Document format picked by the last path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "openapi.json" => Some(DocumentFormat::Json),
            "openapi.yaml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// What a path under one service addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resource {
    Service,
    Table(String),
    Document {
        table: Option<String>,
        format: DocumentFormat,
    },
    Delete,
}

/// Percent-decoded segments after `/service`, or `None` for other paths
pub(crate) fn service_segments(path: &str) -> Option<Result<Vec<String>, ServerError>> {
    let rest = if path == "/service" {
        ""
    } else {
        path.strip_prefix("/service/")?
    };

    Some(
        rest.split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                urlencoding::decode(segment)
                    .map(|decoded| decoded.into_owned())
                    .map_err(|e| {
                        ServerError::BadRequest(format!("Invalid path segment '{}': {}", segment, e))
                    })
            })
            .collect(),
    )
}

/// Resolve the segments after the service name
pub(crate) fn resolve(service: &ServiceDefinition, rest: &[String]) -> Result<Resource, ServerError> {
    let table = |name: &str| {
        service.table(name).map(|t| t.name.clone()).ok_or_else(|| {
            ServerError::NotFound(format!(
                "Decision table '{}' not found in decision service '{}'",
                name,
                service.name()
            ))
        })
    };

    match rest {
        [] => Ok(Resource::Service),
        [second] => {
            if let Some(format) = DocumentFormat::from_segment(second) {
                return Ok(Resource::Document {
                    table: None,
                    format,
                });
            }
            if second == "delete" {
                return Ok(Resource::Delete);
            }
            table(second.as_str()).map(Resource::Table)
        }
        [second, third] => {
            let table = table(second.as_str())?;
            match DocumentFormat::from_segment(third) {
                Some(format) => Ok(Resource::Document {
                    table: Some(table),
                    format,
                }),
                None => Err(ServerError::BadRequest(format!(
                    "Unsupported resource '{}' of decision table '{}'",
                    third, table
                ))),
            }
        }
        _ => Err(ServerError::BadRequest(format!(
            "Path is too deep: /service/{}/{}",
            service.name(),
            rest.join("/")
        ))),
    }
}

fn unsupported(method: &Method, what: &str) -> ServerError {
    ServerError::BadRequest(format!("Method {} is not supported on {}", method, what))
}

/// Fallback handler: `/service` routes, 404 for anything else
#[axum::debug_handler]
pub(super) async fn dispatch(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ServerError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let segments = match service_segments(&path) {
        Some(segments) => segments?,
        None => return Err(ServerError::NotFound(format!("No route for {} {}", method, path))),
    };
    let Some((name, rest)) = segments.split_first() else {
        return Err(ServerError::BadRequest(
            "A decision service name is required: /service/{name}".to_string(),
        ));
    };

    let service = state.registry.lookup(name).await?;
    let resource = resolve(&service, rest)?;
    debug!("{} {} resolved to {:?}", method, path, resource);

    match (resource, method) {
        (Resource::Service, Method::GET) => Ok(service_view(&service, request.headers())),
        (Resource::Service, Method::POST) => evaluate(&state, service, None, request).await,
        (Resource::Service, Method::DELETE) => {
            state.uploads.delete(service.name()).await?;
            Ok(Json(DeleteResponse {
                name: service.name().to_string(),
                status: "deleted".to_string(),
            })
            .into_response())
        }
        (Resource::Table(table), Method::GET) => {
            Ok(table_view(&service, &table, request.headers()))
        }
        (Resource::Table(table), Method::POST) => {
            evaluate(&state, service, Some(table), request).await
        }
        (Resource::Document { table, format }, Method::GET) => {
            document(&service, table.as_deref(), format, request.headers())
        }
        (Resource::Delete, Method::POST) => {
            state.uploads.delete(service.name()).await?;
            if wants_json(request.headers()) {
                return Ok(Json(DeleteResponse {
                    name: service.name().to_string(),
                    status: "deleted".to_string(),
                })
                .into_response());
            }
            Ok(Html(pages::message_page(
                "Decision service deleted",
                &format!("Decision service '{}' has been deleted.", service.name()),
            ))
            .into_response())
        }
        (Resource::Service, method) => Err(unsupported(&method, "a decision service")),
        (Resource::Table(_), method) => Err(unsupported(&method, "a decision table")),
        (Resource::Document { .. }, method) => Err(unsupported(&method, "an OpenAPI document")),
        (Resource::Delete, method) => Err(unsupported(&method, "the delete action")),
    }
}

fn service_view(service: &ServiceDefinition, headers: &HeaderMap) -> Response {
    if !wants_json(headers) {
        return Html(pages::service_page(service)).into_response();
    }

    Json(ServiceOverview {
        name: service.name(),
        glossary: service.glossary().iter().collect(),
        sequence: service.sequence(),
        tables: service
            .tables()
            .iter()
            .map(|table| TableOverview {
                name: &table.name,
                hit_policy: table.hit_policy.code().to_string(),
                inputs: table.input_names().collect(),
                outputs: table.output_names().collect(),
                rules: table.rules.len(),
                listing: None,
            })
            .collect(),
        links: ServiceLinks::new(service.name()),
    })
    .into_response()
}

fn table_view(service: &ServiceDefinition, table: &str, headers: &HeaderMap) -> Response {
    let Some(table) = service.table(table) else {
        return ServerError::NotFound(format!("Decision table '{}' not found", table))
            .into_response();
    };
    if !wants_json(headers) {
        return Html(pages::table_page(service, table)).into_response();
    }

    Json(TableOverview {
        name: &table.name,
        hit_policy: table.hit_policy.code().to_string(),
        inputs: table.input_names().collect(),
        outputs: table.output_names().collect(),
        rules: table.rules.len(),
        listing: Some(rule_listing(table)),
    })
    .into_response()
}

fn document(
    service: &ServiceDefinition,
    table: Option<&str>,
    format: DocumentFormat,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let server = openapi::server_url(headers);
    let document = openapi::service_document(service, table, server.as_deref());

    match format {
        DocumentFormat::Json => Ok(Json(document).into_response()),
        DocumentFormat::Yaml => {
            let yaml = openapi::to_yaml(&document)
                .map_err(|e| ServerError::InternalError(format!("YAML rendering failed: {}", e)))?;
            Ok(([(header::CONTENT_TYPE, "application/yaml")], yaml).into_response())
        }
    }
}

/// Evaluate a service or one of its tables
async fn evaluate(
    state: &AppState,
    service: Arc<ServiceDefinition>,
    table: Option<String>,
    request: Request,
) -> Result<Response, ServerError> {
    let query = Query::<EvaluateQuery>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .map_err(|e| ServerError::BadRequest(format!("Invalid query string: {}", e)))?;

    let body = EvaluationBody::from_request(request, state).await?;
    let is_form = body.is_form();
    let inputs = body.into_inputs();

    info!(
        "Evaluating {}{} with {} inputs",
        service.name(),
        table.as_deref().map(|t| format!("/{}", t)).unwrap_or_default(),
        inputs.len()
    );

    let outcome = run_evaluation(state, service.clone(), table.clone(), inputs.clone()).await;

    if is_form {
        let page = match outcome {
            Ok(decision) => pages::result_page(
                service.name(),
                table.as_deref(),
                &inputs,
                Ok((&decision.outputs, decision.executed.as_slice())),
            ),
            Err(ServerError::RuleEvaluation(errors)) => pages::result_page(
                service.name(),
                table.as_deref(),
                &inputs,
                Err(errors.as_slice()),
            ),
            Err(other) => return Err(other),
        };
        return Ok(Html(page).into_response());
    }

    let decision = outcome?;
    let result = variables_to_json(&decision.outputs);
    if query.trace {
        return Ok(Json(TracedResponse {
            result,
            executed_rules: decision.executed,
        })
        .into_response());
    }
    Ok(Json(result).into_response())
}

/// Run the evaluator on the blocking pool under the configured time bound
async fn run_evaluation(
    state: &AppState,
    service: Arc<ServiceDefinition>,
    table: Option<String>,
    inputs: Variables,
) -> Result<Decision, ServerError> {
    let evaluator = state.evaluator.clone();
    let task = tokio::task::spawn_blocking(move || {
        evaluator.evaluate(&service, table.as_deref(), inputs)
    });

    match tokio::time::timeout(state.evaluation_timeout, task).await {
        Ok(Ok(result)) => result.map_err(ServerError::from),
        Ok(Err(join_error)) => Err(ServerError::InternalError(format!(
            "Evaluation task failed: {}",
            join_error
        ))),
        Err(_) => Err(ServerError::GatewayTimeout(format!(
            "Evaluation did not finish within {} ms",
            state.evaluation_timeout.as_millis()
        ))),
    }
}
