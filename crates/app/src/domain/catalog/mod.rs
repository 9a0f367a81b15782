//! Donation Catalog

pub mod errors;
mod records;
pub mod service;

pub use errors::CatalogServiceError;
pub use service::*;
