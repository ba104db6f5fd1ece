//! API implementations
//!
//! The HTTP surface of Decision Central lives under `rest`.

pub mod rest;

pub use rest::{create_router, AppState};
