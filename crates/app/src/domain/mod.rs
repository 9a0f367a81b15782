//! Kiosk Domain Services

pub mod bootstrap;
pub mod catalog;
pub mod members;
