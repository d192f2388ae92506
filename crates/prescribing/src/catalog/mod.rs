/// Catalog records
pub mod types;

/// Endpoint configuration
pub mod config;

/// HTTP client
pub mod client;

pub use client::{Catalog, CatalogError, HttpCatalog};
pub use config::CatalogConfig;
pub use types::{CatalogId, DrugClass, Medicine};
