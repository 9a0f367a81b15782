//! Kiosk
//!
//! Domain model for a touchscreen donation kiosk: the donation catalog, the
//! session cart, alert-date scheduling, member registration rules and the
//! navigation/inactivity policy. Nothing in this crate performs I/O.

pub mod accounts;
pub mod alerts;
pub mod cart;
pub mod idle;
pub mod ids;
pub mod manifest;
pub mod members;
pub mod navigation;
pub mod payments;
pub mod prelude;
pub mod uuids;
pub mod validation;
