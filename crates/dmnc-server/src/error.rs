//! Server error types
//!
//! `ServerError` is the single place component errors become HTTP
//! responses.

use crate::registry::RegistryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dmnc_parser::ParseError;
use dmnc_runtime::EvaluationError;
use serde_json::json;
use std::fmt;

/// Server error type
#[derive(Debug)]
pub enum ServerError {
    /// Malformed request, unsupported method or route
    BadRequest(String),

    /// Unknown service, table or route
    NotFound(String),

    /// Upload of a name that is already registered
    DuplicateName(String),

    /// Uploaded file could not be loaded
    ParseError(String),

    /// The evaluator rejected the inputs; reported with status 200
    RuleEvaluation(Vec<String>),

    /// Evaluation exceeded the configured bound
    GatewayTimeout(String),

    /// Internal server error
    InternalError(String),
}

impl ServerError {
    /// Stable error kind carried in every error body
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BadRequest",
            ServerError::NotFound(_) => "NotFound",
            ServerError::DuplicateName(_) => "DuplicateName",
            ServerError::ParseError(_) => "ParseError",
            ServerError::RuleEvaluation(_) => "RuleEvaluationError",
            ServerError::GatewayTimeout(_) => "GatewayTimeout",
            ServerError::InternalError(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::ParseError(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::DuplicateName(_) => StatusCode::CONFLICT,
            ServerError::RuleEvaluation(_) => StatusCode::OK,
            ServerError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client
    pub fn public_message(&self) -> String {
        match self {
            ServerError::InternalError(_) => "Internal server error".to_string(),
            ServerError::RuleEvaluation(errors) => errors.join("; "),
            ServerError::BadRequest(msg)
            | ServerError::NotFound(msg)
            | ServerError::DuplicateName(msg)
            | ServerError::ParseError(msg)
            | ServerError::GatewayTimeout(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServerError::DuplicateName(msg) => write!(f, "Duplicate name: {}", msg),
            ServerError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ServerError::RuleEvaluation(errors) => {
                write!(f, "Rule evaluation error: {}", errors.join("; "))
            }
            ServerError::GatewayTimeout(msg) => write!(f, "Gateway timeout: {}", msg),
            ServerError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ServerError::RuleEvaluation(errors) => {
                tracing::warn!("Rule evaluation failed: {}", errors.join("; "));
                json!({
                    "result": {},
                    "errors": errors,
                    "kind": self.kind(),
                    "status": status.as_u16(),
                })
            }
            ServerError::InternalError(detail) => {
                tracing::error!("Internal error: {}", detail);
                json!({
                    "error": self.public_message(),
                    "kind": self.kind(),
                    "status": status.as_u16(),
                })
            }
            _ => {
                tracing::warn!("{}", self);
                json!({
                    "error": self.public_message(),
                    "kind": self.kind(),
                    "status": status.as_u16(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ServerError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateName(_) => ServerError::DuplicateName(err.to_string()),
            RegistryError::NotFound(_) => ServerError::NotFound(err.to_string()),
        }
    }
}

impl From<ParseError> for ServerError {
    fn from(err: ParseError) -> Self {
        ServerError::ParseError(err.to_string())
    }
}

impl From<EvaluationError> for ServerError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::UnknownTable(_) => ServerError::NotFound(err.to_string()),
            other => ServerError::RuleEvaluation(vec![other.to_string()]),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_bad_request_display() {
        let err = ServerError::BadRequest("missing field".to_string());
        assert_eq!(err.to_string(), "Bad request: missing field");
    }

    #[test]
    fn test_rule_evaluation_display() {
        let err = ServerError::RuleEvaluation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Rule evaluation error: a; b");
    }

    #[test]
    fn test_registry_error_conversion() {
        let err: ServerError = RegistryError::DuplicateName("Loan".to_string()).into();
        assert!(matches!(err, ServerError::DuplicateName(_)));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ServerError = RegistryError::NotFound("Loan".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_evaluation_error_conversion() {
        let err: ServerError = EvaluationError::NoMatch {
            table: "Eligibility".to_string(),
        }
        .into();
        assert!(matches!(err, ServerError::RuleEvaluation(ref errors) if errors.len() == 1));
        assert_eq!(err.status(), StatusCode::OK);

        let err: ServerError = EvaluationError::UnknownTable("Missing".to_string()).into();
        assert_eq!(err.kind(), "NotFound");
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: ServerError = ParseError::UnsupportedFormat("workbook".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "ParseError");
        assert!(err.to_string().contains("workbook"));
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: ServerError = anyhow::anyhow!("something went wrong").into();
        assert!(err.to_string().contains("Internal error"));
        assert!(err.to_string().contains("something went wrong"));
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = body_json(ServerError::NotFound("no such service".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no such service");
        assert_eq!(body["kind"], "NotFound");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_rule_evaluation_body_shape() {
        let (status, body) =
            body_json(ServerError::RuleEvaluation(vec!["no rule matched".to_string()])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], serde_json::json!({}));
        assert_eq!(body["errors"][0], "no rule matched");
        assert_eq!(body["kind"], "RuleEvaluationError");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            body_json(ServerError::InternalError("join handle panicked".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServerError>();
    }
}
