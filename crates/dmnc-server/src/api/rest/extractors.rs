//! Custom extractors
//!
//! Provides request extractors that reject with `ServerError`, so every
//! malformed request gets the same JSON error body.

use super::conversions::{form_to_variables, json_to_variables};
use crate::error::ServerError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, HeaderMap},
    Form, Json,
};
use dmnc_runtime::Variables;

/// Custom JSON extractor with better error messages
pub struct JsonExtractor<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonExtractor<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => {
                let error_message = match rejection {
                    JsonRejection::JsonDataError(err) => {
                        format!("Invalid JSON data: {}", err)
                    }
                    JsonRejection::JsonSyntaxError(err) => {
                        format!("JSON syntax error: {}", err)
                    }
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing 'Content-Type: application/json' header".to_string()
                    }
                    _ => format!("Failed to parse JSON: {}", rejection),
                };

                Err(ServerError::BadRequest(error_message))
            }
        }
    }
}

/// Inputs of an evaluation request
pub enum EvaluationBody {
    /// JSON object, decoded through the type bridge
    Json(Variables),
    /// Form post from the generated HTML page
    Form(Variables),
}

impl EvaluationBody {
    pub fn into_inputs(self) -> Variables {
        match self {
            EvaluationBody::Json(inputs) | EvaluationBody::Form(inputs) => inputs,
        }
    }

    pub fn is_form(&self) -> bool {
        matches!(self, EvaluationBody::Form(_))
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for EvaluationBody
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form_post(req.headers()) {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(format!("Invalid form data: {}", e)))?;
            return Ok(EvaluationBody::Form(form_to_variables(fields)));
        }

        let JsonExtractor(value) = JsonExtractor::<serde_json::Value>::from_request(req, state).await?;
        match value {
            serde_json::Value::Object(obj) => Ok(EvaluationBody::Json(json_to_variables(obj))),
            other => Err(ServerError::BadRequest(format!(
                "Request body must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn is_form_post(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

fn accepts(headers: &HeaderMap, media_type: &str) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(media_type))
}

/// Whether the client asked for JSON rather than a page
pub fn wants_json(headers: &HeaderMap) -> bool {
    accepts(headers, "application/json")
}

/// Whether the client is a browser expecting a page
pub fn wants_html(headers: &HeaderMap) -> bool {
    accepts(headers, "text/html")
}
