//! Checkout Observer

use crate::checkout::CheckoutState;

/// Receives progress from [`CardReaderCheckout`](crate::checkout::CardReaderCheckout)
/// so a presentation layer can drive its payment dialog.
///
/// Every method has a no-op default; implement the ones you need.
pub trait CheckoutObserver: Send {
    /// Called on every state transition.
    fn on_state(&mut self, _state: CheckoutState) {}

    /// Called with each operator-facing message, in the order they should be shown.
    fn on_message(&mut self, _message: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CheckoutObserver for NoopObserver {}
