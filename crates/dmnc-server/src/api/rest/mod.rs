//! REST API implementation
//!
//! Modular REST API with clean separation of concerns:
//! - types: Application state and request/response type definitions
//! - extractors: Custom request extractors and content negotiation
//! - conversions: The JSON/FEEL type bridge
//! - handlers: Static endpoint handlers (catalog, health, upload)
//! - dispatcher: Per-service routes resolved against the live registry
//! - router: Router creation and configuration
//! - tests: Unit tests for the type bridge

pub mod conversions;
mod dispatcher;
mod extractors;
mod handlers;
mod router;
mod tests;
pub mod types;

// Re-export public API
pub use extractors::{EvaluationBody, JsonExtractor};
pub use router::create_router;
pub use types::{
    AppState, DeleteResponse, HealthResponse, ServiceLinks, ServiceSummary, TracedResponse,
    UploadResponse,
};
