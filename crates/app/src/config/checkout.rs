use std::time::Duration;

use clap::Args;

use crate::checkout::CheckoutTimings;

#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Pause between card-reader status polls, in milliseconds
    #[arg(long, env = "KIOSK_POLL_DELAY_MS", default_value_t = 500)]
    pub poll_delay_ms: u64,

    /// How long a payment failure stays on screen, in milliseconds
    #[arg(long, env = "KIOSK_FAILURE_DWELL_MS", default_value_t = 1_000)]
    pub failure_dwell_ms: u64,

    /// How long a cancellation confirmation stays on screen, in milliseconds
    #[arg(long, env = "KIOSK_CANCEL_DWELL_MS", default_value_t = 2_000)]
    pub cancel_dwell_ms: u64,
}

impl CheckoutConfig {
    pub fn timings(&self) -> CheckoutTimings {
        CheckoutTimings {
            poll_delay: Duration::from_millis(self.poll_delay_ms),
            failure_dwell: Duration::from_millis(self.failure_dwell_ms),
            cancel_dwell: Duration::from_millis(self.cancel_dwell_ms),
        }
    }
}
