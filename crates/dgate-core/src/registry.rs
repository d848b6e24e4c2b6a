//! Service registry abstraction consulted during rule revalidation

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::error::{Error, Result};
use crate::service::{ServiceKey, ServiceType};

/// Failure to resolve a service key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry has no service with this key
    #[error("Service not found: {0}")]
    NotFound(ServiceKey),

    /// The registry could not be queried
    #[error("Service registry unavailable: {0}")]
    Unavailable(String),
}

/// Source of truth for which services currently exist and what type they are
#[cfg_attr(test, mockall::automock)]
pub trait ServiceRegistry: Send + Sync {
    /// Current type code of a service
    fn service_type(&self, key: &ServiceKey) -> std::result::Result<ServiceType, RegistryError>;
}

/// Thread-safe registry held in memory
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    services: DashMap<ServiceKey, ServiceType>,
}

/// On-disk registry entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServiceEntry {
    /// Key, as text or `hex:<digits>`
    key: String,
    /// Type code
    #[serde(rename = "type")]
    service_type: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "service")]
    services: Vec<ServiceEntry>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or retype a service
    pub fn insert(&self, key: ServiceKey, service_type: ServiceType) {
        self.services.insert(key, service_type);
    }

    /// Forget a service
    pub fn remove(&self, key: &ServiceKey) {
        self.services.remove(key);
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no services are registered
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Parse a registry from TOML
    ///
    /// ```toml
    /// [[service]]
    /// key = "my files"
    /// type = 2
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content)?;
        let registry = Self::new();

        for (idx, entry) in file.services.into_iter().enumerate() {
            let key: ServiceKey = entry
                .key
                .parse()
                .map_err(|e| Error::config_value(format!("service[{idx}].key"), format!("{e}")))?;
            registry.insert(key, ServiceType(entry.service_type));
        }

        Ok(registry)
    }

    /// Load a registry from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let registry = Self::from_toml(&content)?;
        info!("Loaded {} services from {}", registry.len(), path.display());
        Ok(registry)
    }
}

impl ServiceRegistry for InMemoryRegistry {
    fn service_type(&self, key: &ServiceKey) -> std::result::Result<ServiceType, RegistryError> {
        self.services
            .get(key)
            .map(|entry| *entry.value())
            .ok_or_else(|| RegistryError::NotFound(key.clone()))
    }
}
