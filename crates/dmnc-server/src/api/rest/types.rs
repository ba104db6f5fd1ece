//! REST API type definitions
//!
//! Application state and the request/response types of the static routes.

use crate::config::ServerConfig;
use crate::registry::ServiceRegistry;
use crate::upload::UploadController;
use dmnc_core::{GlossaryEntry, ServiceDefinition};
use dmnc_parser::{DmnLoader, ServiceLoader};
use dmnc_runtime::{DecisionEvaluator, DmnEngine, ExecutedRule};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub evaluator: Arc<dyn DecisionEvaluator>,
    pub uploads: UploadController,
    pub evaluation_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// State backed by the shipped loader and evaluator
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_components(
            Arc::new(ServiceRegistry::new()),
            Arc::new(DmnEngine::new()),
            Arc::new(DmnLoader::new()),
            config,
        )
    }

    pub fn with_components(
        registry: Arc<ServiceRegistry>,
        evaluator: Arc<dyn DecisionEvaluator>,
        loader: Arc<dyn ServiceLoader>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            uploads: UploadController::new(registry.clone(), loader),
            registry,
            evaluator,
            evaluation_timeout: config.evaluation_timeout(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: usize,
}

/// Query options of `POST /upload`
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub replace: bool,
}

/// Query options of an evaluation request
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateQuery {
    /// Return the rules that fired alongside the result
    #[serde(default)]
    pub trace: bool,
}

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub name: String,
    /// `created` or `replaced`
    pub status: String,
    pub tables: Vec<String>,
    pub links: ServiceLinks,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub name: String,
    pub status: String,
}

/// Evaluation response with `?trace=true`
#[derive(Debug, Serialize)]
pub struct TracedResponse {
    pub result: serde_json::Value,
    pub executed_rules: Vec<ExecutedRule>,
}

/// URLs of one service's generated resources
#[derive(Debug, Clone, Serialize)]
pub struct ServiceLinks {
    pub service: String,
    pub openapi_json: String,
    pub openapi_yaml: String,
}

impl ServiceLinks {
    pub fn new(name: &str) -> Self {
        let base = service_path(name);
        Self {
            openapi_json: format!("{}/openapi.json", base),
            openapi_yaml: format!("{}/openapi.yaml", base),
            service: base,
        }
    }
}

/// Catalog entry (`GET /` with `Accept: application/json`)
#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub loaded_at: String,
    pub tables: Vec<String>,
    pub links: ServiceLinks,
}

impl From<&ServiceDefinition> for ServiceSummary {
    fn from(service: &ServiceDefinition) -> Self {
        Self {
            name: service.name().to_string(),
            format: service.source().format.as_str().to_string(),
            file_name: service.source().file_name.clone(),
            loaded_at: service.source().loaded_at.to_rfc3339(),
            tables: service.tables().iter().map(|t| t.name.clone()).collect(),
            links: ServiceLinks::new(service.name()),
        }
    }
}

/// Service overview (`GET /service/{name}` with `Accept: application/json`)
#[derive(Debug, Serialize)]
pub struct ServiceOverview<'a> {
    pub name: &'a str,
    pub glossary: Vec<&'a GlossaryEntry>,
    pub sequence: &'a [String],
    pub tables: Vec<TableOverview<'a>>,
    pub links: ServiceLinks,
}

/// Table overview, also the JSON form of `GET /service/{name}/{table}`
#[derive(Debug, Serialize)]
pub struct TableOverview<'a> {
    pub name: &'a str,
    pub hit_policy: String,
    pub inputs: Vec<&'a str>,
    pub outputs: Vec<&'a str>,
    pub rules: usize,
    /// Pipe-delimited rendering of the rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<String>,
}

/// Absolute path of a service, with the name percent-encoded
pub fn service_path(name: &str) -> String {
    format!("/service/{}", urlencoding::encode(name))
}

/// Absolute path of one table of a service
pub fn table_path(service: &str, table: &str) -> String {
    format!("{}/{}", service_path(service), urlencoding::encode(table))
}
