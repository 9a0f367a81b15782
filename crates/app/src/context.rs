//! Kiosk Context

use std::sync::Arc;

use jiff::Timestamp;
use kiosk::{
    cart::Cart,
    idle::{IdleState, InactivityTimer},
    navigation::Route,
};
use thiserror::Error;
use tracing::info;

use crate::{
    backend::{BackendError, HttpBackend, KioskBackend},
    checkout::{CardReaderCheckout, CheckoutTimings, DonationAttribution},
    config::KioskConfig,
    domain::{
        bootstrap::{BackendBootstrapService, BootstrapService},
        catalog::{BackendCatalogService, CatalogService},
        members::{BackendMembersService, MembersService},
    },
    session::KioskSession,
};

#[derive(Debug, Error)]
pub enum KioskInitError {
    #[error("failed to build backend client")]
    Backend(#[source] BackendError),
}

/// Everything one kiosk needs: the session, the services bound to it, the
/// cart and the inactivity timer for the current screen.
pub struct KioskContext {
    pub session: Arc<KioskSession>,
    pub catalog: Arc<dyn CatalogService>,
    pub members: Arc<dyn MembersService>,
    pub bootstrap: Arc<dyn BootstrapService>,
    pub checkout: CardReaderCheckout,
    pub attribution: DonationAttribution,
    pub cart: Cart,
    idle: InactivityTimer,
}

impl KioskContext {
    /// Build a context talking to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_config(config: &KioskConfig, now: Timestamp) -> Result<Self, KioskInitError> {
        let backend =
            HttpBackend::new(&config.backend.to_http()).map_err(KioskInitError::Backend)?;

        Ok(Self::new(Arc::new(backend), config.checkout.timings(), now))
    }

    /// Build a context over any backend. Starts on the login screen.
    pub fn new(backend: Arc<dyn KioskBackend>, timings: CheckoutTimings, now: Timestamp) -> Self {
        let session = Arc::new(KioskSession::new(backend));

        Self {
            catalog: Arc::new(BackendCatalogService::new(Arc::clone(&session))),
            members: Arc::new(BackendMembersService::new(Arc::clone(&session))),
            bootstrap: Arc::new(BackendBootstrapService::new(Arc::clone(&session))),
            checkout: CardReaderCheckout::new(Arc::clone(&session), timings),
            attribution: DonationAttribution::new(Arc::clone(&session)),
            cart: Cart::default(),
            idle: InactivityTimer::new(Route::Login, now),
            session,
        }
    }

    /// The screen currently shown.
    pub fn route(&self) -> Route {
        self.idle.route()
    }

    /// Move to `route`. Entering the start screen empties the cart.
    pub fn navigate(&mut self, route: Route, now: Timestamp) {
        if route == Route::Start {
            self.cart.clear();
        }

        self.idle.navigate(route, now);
    }

    /// Any touch or keypress on the current screen.
    pub fn record_activity(&mut self, now: Timestamp) {
        self.idle.record_activity(now);
    }

    /// Sample the inactivity timer. On expiry the cart is emptied and the
    /// kiosk moves to the redirect screen; a redirect to login also ends the
    /// session.
    pub async fn tick(&mut self, now: Timestamp) -> IdleState {
        let state = self.idle.state(now);

        if let IdleState::Expired { redirect } = state {
            info!(from = %self.idle.route(), to = %redirect, "inactivity limit reached");

            self.cart.clear();

            if redirect == Route::Login {
                self.session.teardown().await;
            }

            self.navigate(redirect, now);
        }

        state
    }
}
