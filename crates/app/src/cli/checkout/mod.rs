use clap::{Args, Subcommand};

mod preview;

#[derive(Debug, Args)]
pub(crate) struct CheckoutCommand {
    #[command(subcommand)]
    command: CheckoutSubcommand,
}

#[derive(Debug, Subcommand)]
enum CheckoutSubcommand {
    Preview(preview::PreviewArgs),
}

pub(crate) fn run(command: CheckoutCommand) -> Result<(), String> {
    match command.command {
        CheckoutSubcommand::Preview(args) => preview::run(args),
    }
}
