use clap::{Args, Subcommand};

mod check;
mod list;

#[derive(Debug, Args)]
pub(crate) struct VouchersCommand {
    #[command(subcommand)]
    command: VouchersSubcommand,
}

#[derive(Debug, Subcommand)]
enum VouchersSubcommand {
    List(list::ListVouchersArgs),
    Check(check::CheckVoucherArgs),
}

pub(crate) async fn run(command: VouchersCommand) -> Result<(), String> {
    match command.command {
        VouchersSubcommand::List(args) => list::run(args).await,
        VouchersSubcommand::Check(args) => check::run(args).await,
    }
}
