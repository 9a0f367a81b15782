//! Members

pub mod errors;
mod records;
pub mod service;

pub use errors::MembersServiceError;
pub use service::*;
