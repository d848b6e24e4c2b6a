//! # dgate Core
//!
//! Thread-safe blacklist filter for services, split into file and tag domains.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Classification** - Service type codes mapped to file, tag or unclassified domains
//! - **Domain filter** - Rule store with derived blacklist sets, rebuilt on every change
//! - **Change tracking** - Added/removed rules between two filters, with a text summary
//! - **Revalidation** - Dropping rules whose service is gone from a [`ServiceRegistry`]
//! - **Configuration** - TOML configuration
//!
//! ## Example
//!
//! ```rust
//! use dgate_core::{DomainFilter, ServiceKey, ServiceType};
//!
//! let filter = DomainFilter::new();
//! filter.add_rule(ServiceKey::from("my files"), ServiceType::LOCAL_FILE_DOMAIN);
//!
//! assert!(!filter.domain_ok(&ServiceKey::from("my files")));
//! assert!(filter.domain_ok(&ServiceKey::from("other")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod filter;
pub mod registry;
pub mod service;

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{Changes, CleanOutcome, DomainFilter, Rules};
pub use registry::{InMemoryRegistry, RegistryError, ServiceRegistry};
pub use service::{classify, DomainKind, ServiceKey, ServiceType};
