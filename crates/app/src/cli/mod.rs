use clap::{Parser, Subcommand};
use petlor_app::{config::logging::LoggingConfig, observability};

mod checkout;
mod orders;
mod vouchers;

#[derive(Debug, Parser)]
#[command(name = "petlor", about = "PetLor operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Orders(orders::OrdersCommand),
    Vouchers(vouchers::VouchersCommand),
    Checkout(checkout::CheckoutCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_subscriber(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Orders(command) => orders::run(command).await,
            Commands::Vouchers(command) => vouchers::run(command).await,
            Commands::Checkout(command) => checkout::run(command),
        }
    }
}
