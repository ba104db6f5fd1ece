//! Service registry
//!
//! The directory of loaded decision services. Definitions are immutable and
//! shared as `Arc`, so a request that already holds one keeps working after
//! the name is replaced or removed.

use dmnc_core::ServiceDefinition;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Decision service '{0}' already exists")]
    DuplicateName(String),

    #[error("Decision service '{0}' not found")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// What an insert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Created,
    Replaced,
}

#[derive(Default)]
struct Services {
    /// Catalog order
    order: Vec<String>,
    by_name: HashMap<String, Arc<ServiceDefinition>>,
}

/// Concurrency-safe directory of decision services keyed by name
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<Services>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a definition under its name.
    ///
    /// Fails with `DuplicateName` when the name is taken and `replace` is
    /// false. A replaced service keeps its catalog position.
    pub async fn insert(&self, definition: ServiceDefinition, replace: bool) -> Result<Insertion> {
        let name = definition.name().to_string();
        let mut services = self.services.write().await;

        if services.by_name.contains_key(&name) {
            if !replace {
                return Err(RegistryError::DuplicateName(name));
            }
            services.by_name.insert(name.clone(), Arc::new(definition));
            tracing::info!(service = %name, "Replaced decision service");
            return Ok(Insertion::Replaced);
        }

        services.order.push(name.clone());
        services.by_name.insert(name.clone(), Arc::new(definition));
        tracing::info!(service = %name, "Registered decision service");
        Ok(Insertion::Created)
    }

    /// Unpublish a service, returning the removed definition
    pub async fn remove(&self, name: &str) -> Result<Arc<ServiceDefinition>> {
        let mut services = self.services.write().await;
        let removed = services
            .by_name
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        services.order.retain(|n| n != name);
        tracing::info!(service = %name, "Removed decision service");
        Ok(removed)
    }

    pub async fn lookup(&self, name: &str) -> Result<Arc<ServiceDefinition>> {
        self.services
            .read()
            .await
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Registered services in insertion order
    pub async fn list(&self) -> Vec<Arc<ServiceDefinition>> {
        let services = self.services.read().await;
        services
            .order
            .iter()
            .filter_map(|name| services.by_name.get(name).cloned())
            .collect()
    }

    /// Registered names in insertion order
    pub async fn names(&self) -> Vec<String> {
        self.services.read().await.order.clone()
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
