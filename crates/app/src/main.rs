//! Kiosk operator CLI

use std::process;

use kiosk_app::observability;

mod cli;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = observability::init(&cli.config.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
