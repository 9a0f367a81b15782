//! Kiosk Bootstrap
//!
//! Everything loaded once the operator has logged in: the paired card
//! readers, the default member ids and the tenant branding.

pub mod errors;
pub mod service;

pub use errors::BootstrapServiceError;
pub use service::*;
