//! DMN Decision Central HTTP Server Library
//!
//! Hosts uploaded decision services behind one process: the service
//! registry, the dynamic `/service/...` dispatcher, the JSON/FEEL type
//! bridge, the page and OpenAPI generators and the upload controller.

pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod registry;
pub mod upload;
