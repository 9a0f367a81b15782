//! Inactivity Timer
//!
//! An unattended kiosk must not keep a donor's cart on screen. The timer is
//! armed on every non-exempt screen, shows a countdown during the last
//! [`WARNING_DURATION`] and expires after [`INACTIVITY_LIMIT`].
//!
//! The timer is a pure function of the last activity timestamp: callers
//! sample [`InactivityTimer::state`] on their own tick.

use jiff::{SignedDuration, Timestamp};

use crate::navigation::Route;

/// Time without activity after which the session is reset.
pub const INACTIVITY_LIMIT: SignedDuration = SignedDuration::from_secs(120);

/// Length of the "are you still there?" countdown before expiry.
pub const WARNING_DURATION: SignedDuration = SignedDuration::from_secs(30);

/// What the screen should show for the current inactivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    /// On an exempt screen; nothing is tracked.
    Disarmed,

    /// Armed, no warning yet.
    Active,

    /// Countdown visible.
    Warning {
        /// Whole seconds left before expiry, rounded up.
        remaining_seconds: u64,
    },

    /// Time is up: clear the cart and navigate to `redirect`.
    Expired {
        /// Screen to send the operator to.
        redirect: Route,
    },
}

/// Tracks operator activity on the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityTimer {
    route: Route,
    last_activity: Timestamp,
}

impl InactivityTimer {
    /// Start tracking on `route` at `now`.
    pub fn new(route: Route, now: Timestamp) -> Self {
        Self {
            route,
            last_activity: now,
        }
    }

    /// The screen being tracked.
    pub fn route(&self) -> Route {
        self.route
    }

    /// Move to a new screen. Navigation counts as activity.
    pub fn navigate(&mut self, route: Route, now: Timestamp) {
        self.route = route;
        self.last_activity = now;
    }

    /// Reset the countdown.
    pub fn record_activity(&mut self, now: Timestamp) {
        self.last_activity = now;
    }

    /// Inactivity state at `now`.
    pub fn state(&self, now: Timestamp) -> IdleState {
        if self.route.is_idle_exempt() {
            return IdleState::Disarmed;
        }

        let idle_for = now.duration_since(self.last_activity);

        if idle_for >= INACTIVITY_LIMIT {
            return IdleState::Expired {
                redirect: self.route.idle_redirect(),
            };
        }

        let remaining = INACTIVITY_LIMIT - idle_for;

        if remaining > WARNING_DURATION {
            return IdleState::Active;
        }

        let mut remaining_seconds = remaining.as_secs();

        if remaining.subsec_nanos() > 0 {
            remaining_seconds += 1;
        }

        IdleState::Warning {
            remaining_seconds: u64::try_from(remaining_seconds).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn at(seconds: i64) -> TestResult<Timestamp> {
        Ok(Timestamp::from_second(1_740_992_400 + seconds)?)
    }

    #[test]
    fn exempt_screens_never_time_out() -> TestResult {
        let timer = InactivityTimer::new(Route::Start, at(0)?);

        assert_eq!(timer.state(at(3_600)?), IdleState::Disarmed);

        Ok(())
    }

    #[test]
    fn warning_counts_down_the_last_thirty_seconds() -> TestResult {
        let timer = InactivityTimer::new(Route::Cart, at(0)?);

        assert_eq!(timer.state(at(89)?), IdleState::Active);
        assert_eq!(
            timer.state(at(90)?),
            IdleState::Warning {
                remaining_seconds: 30
            }
        );
        assert_eq!(
            timer.state(at(119)?),
            IdleState::Warning {
                remaining_seconds: 1
            }
        );

        Ok(())
    }

    #[test]
    fn expiry_redirects_by_screen() -> TestResult {
        let cart = InactivityTimer::new(Route::Cart, at(0)?);
        let reader = InactivityTimer::new(Route::SelectReader, at(0)?);

        assert_eq!(
            cart.state(at(120)?),
            IdleState::Expired {
                redirect: Route::Start
            }
        );
        assert_eq!(
            reader.state(at(121)?),
            IdleState::Expired {
                redirect: Route::Login
            }
        );

        Ok(())
    }

    #[test]
    fn activity_resets_the_timer() -> TestResult {
        let mut timer = InactivityTimer::new(Route::SelectAccounts, at(0)?);

        timer.record_activity(at(100)?);

        assert_eq!(timer.state(at(150)?), IdleState::Active);

        timer.navigate(Route::Login, at(150)?);

        assert_eq!(timer.state(at(1_000)?), IdleState::Disarmed);

        Ok(())
    }
}
