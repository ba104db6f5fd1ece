//! Upload/delete controller
//!
//! Builds a service definition from an uploaded file and installs it in
//! the registry, or removes one. The API routes and the HTML form routes
//! both go through here.

use crate::error::ServerError;
use crate::registry::{Insertion, ServiceRegistry};
use dmnc_core::SourceFormat;
use dmnc_parser::ServiceLoader;
use std::sync::Arc;

/// An uploaded rule file
#[derive(Debug, Clone)]
pub struct Upload {
    /// Explicit service name; the file name stem is used when absent
    pub name: Option<String>,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub replace: bool,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub name: String,
    pub insertion: Insertion,
    pub tables: Vec<String>,
}

/// Installs and removes decision services
#[derive(Clone)]
pub struct UploadController {
    registry: Arc<ServiceRegistry>,
    loader: Arc<dyn ServiceLoader>,
}

impl UploadController {
    pub fn new(registry: Arc<ServiceRegistry>, loader: Arc<dyn ServiceLoader>) -> Self {
        Self { registry, loader }
    }

    /// Parse the file completely, then publish it.
    ///
    /// Nothing is registered when parsing fails.
    pub async fn upload(&self, upload: Upload) -> Result<UploadReceipt, ServerError> {
        let (stem, format) = split_file_name(&upload.file_name)?;
        let name = upload
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or(stem);
        if name.is_empty() {
            return Err(ServerError::BadRequest(
                "A decision service needs a non-empty name".to_string(),
            ));
        }

        tracing::info!(
            "Loading '{}' as decision service '{}' ({} bytes, {})",
            upload.file_name,
            name,
            upload.bytes.len(),
            format.as_str()
        );

        let loader = self.loader.clone();
        let file_name = upload.file_name;
        let bytes = upload.bytes;
        let service_name = name.clone();
        let definition = tokio::task::spawn_blocking(move || {
            loader.load(&service_name, Some(file_name.as_str()), format, &bytes)
        })
        .await
        .map_err(|e| ServerError::InternalError(format!("Loader task failed: {}", e)))??;

        let tables = definition.tables().iter().map(|t| t.name.clone()).collect();
        let insertion = self.registry.insert(definition, upload.replace).await?;

        Ok(UploadReceipt {
            name,
            insertion,
            tables,
        })
    }

    pub async fn delete(&self, name: &str) -> Result<(), ServerError> {
        self.registry.remove(name).await?;
        Ok(())
    }
}

/// Service name and source format from an uploaded file name
fn split_file_name(file_name: &str) -> Result<(String, SourceFormat), ServerError> {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);

    let (stem, extension) = base.rsplit_once('.').ok_or_else(|| {
        ServerError::BadRequest(format!("File '{}' has no extension", file_name))
    })?;

    let format = SourceFormat::from_extension(extension).ok_or_else(|| {
        ServerError::BadRequest(format!(
            "Unsupported file extension '.{}' (expected .dmn, .xml, .yaml, .yml, .xlsx or .xlsm)",
            extension
        ))
    })?;

    Ok((stem.trim().to_string(), format))
}
