use clap::{Parser, Subcommand};
use jiff::Timestamp;
use kiosk_app::{config::KioskConfig, context::KioskContext};

mod catalog;
mod checkout;
mod readers;
mod search;
mod session;

#[derive(Debug, Parser)]
#[command(name = "kiosk-cli", about = "Donation kiosk operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: KioskConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the card readers available to this kiosk
    Readers,
    /// List donation groups, or the accounts of one group
    Catalog(catalog::CatalogArgs),
    /// Find a member by email or phone
    Search(search::SearchArgs),
    /// Take a card payment for a cart and attribute it
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    /// Parse the command line after loading `.env`.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let mut context = KioskContext::from_config(&self.config, Timestamp::now())
            .map_err(|error| format!("failed to start kiosk: {error}"))?;

        session::login(&context, &self.config).await?;

        match self.command {
            Commands::Readers => readers::run(&context).await,
            Commands::Catalog(args) => catalog::run(&context, args).await,
            Commands::Search(args) => search::run(&context, args).await,
            Commands::Checkout(args) => checkout::run(&mut context, &self.config, args).await,
        }
    }
}
