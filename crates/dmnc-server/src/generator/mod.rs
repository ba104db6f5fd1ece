//! Page and API document generation
//!
//! Everything here is derived from a `ServiceDefinition` on each request;
//! nothing is cached, so a replaced service is described correctly at once.

pub mod listing;
pub mod openapi;
pub mod pages;

pub use listing::rule_listing;
pub use openapi::{server_url, service_document, to_yaml, upload_document};
