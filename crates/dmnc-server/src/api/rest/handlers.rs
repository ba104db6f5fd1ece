//! API endpoint handlers
//!
//! HTTP request handlers for the static routes. Per-service routes are
//! handled by the dispatcher.

use super::extractors::{wants_html, wants_json};
use super::types::*;
use crate::error::ServerError;
use crate::generator::{openapi, pages};
use crate::registry::Insertion;
use crate::upload::Upload;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::info;

/// Health check endpoint
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: state.registry.len().await,
    })
}

/// Service catalog: HTML page, or JSON with `Accept: application/json`
#[axum::debug_handler]
pub(super) async fn catalog(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let services = state.registry.list().await;

    if wants_json(&headers) {
        let summaries: Vec<ServiceSummary> = services
            .iter()
            .map(|service| ServiceSummary::from(service.as_ref()))
            .collect();
        return Json(summaries).into_response();
    }

    Html(pages::catalog_page(&services)).into_response()
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "yes" | "1"
    )
}

fn multipart_error(err: impl std::fmt::Display) -> ServerError {
    ServerError::BadRequest(format!("Invalid multipart upload: {}", err))
}

/// Upload endpoint: multipart field `file`, optional `name` and `replace`
#[axum::debug_handler]
pub(super) async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ServerError> {
    let mut multipart = multipart.map_err(multipart_error)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut name = None;
    let mut replace = query.replace;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|f| !f.trim().is_empty())
                    .ok_or_else(|| {
                        ServerError::BadRequest("Uploaded file has no file name".to_string())
                    })?;
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("replace") => replace |= truthy(&field.text().await.map_err(multipart_error)?),
            other => info!("Ignoring multipart field {:?}", other),
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| {
        ServerError::BadRequest("Multipart field 'file' is required".to_string())
    })?;

    let receipt = state
        .uploads
        .upload(Upload {
            name,
            file_name,
            bytes,
            replace,
        })
        .await?;

    let (status, label) = match receipt.insertion {
        Insertion::Created => (StatusCode::CREATED, "created"),
        Insertion::Replaced => (StatusCode::OK, "replaced"),
    };

    if wants_html(&headers) {
        let message = format!(
            "Decision service '{}' {} with {} decision table(s).",
            receipt.name,
            label,
            receipt.tables.len()
        );
        let page = pages::message_page(&format!("Decision service {}", receipt.name), &message);
        return Ok((status, Html(page)).into_response());
    }

    Ok((
        status,
        Json(UploadResponse {
            links: ServiceLinks::new(&receipt.name),
            name: receipt.name,
            status: label.to_string(),
            tables: receipt.tables,
        }),
    )
        .into_response())
}

/// OpenAPI description of the upload and delete endpoints
pub(super) async fn upload_openapi(headers: HeaderMap) -> Json<serde_json::Value> {
    let server = openapi::server_url(&headers);
    Json(openapi::upload_document(server.as_deref()))
}
