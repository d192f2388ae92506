//! Prescription Order Form Models

/// Drug catalog client
pub mod catalog;

/// Order form aggregate
pub mod orders;

/// Domain errors
pub mod errors;

pub use errors::{Error, Field};
