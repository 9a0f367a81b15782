//! Kiosk application: backend client, session, domain services and checkout.

pub mod backend;
pub mod checkout;
pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod session;

#[cfg(test)]
mod test;
