//! Kiosk Configuration

use clap::Args;

mod backend;
mod checkout;
mod observability;
mod operator;

pub use backend::BackendConfig;
pub use checkout::CheckoutConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use operator::OperatorConfig;

/// Kiosk configuration, flattened into the binary's command line.
#[derive(Debug, Args)]
pub struct KioskConfig {
    #[command(flatten)]
    pub backend: BackendConfig,

    #[command(flatten)]
    pub operator: OperatorConfig,

    #[command(flatten)]
    pub checkout: CheckoutConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,
}
