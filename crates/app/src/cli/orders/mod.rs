use clap::{Args, Subcommand};
use petlor_app::{config::ApiSettings, context::AppContext, desk::OrderDesk};

mod advance;
mod bulk;
mod delete;
mod edit;
mod list;
mod show;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    List(list::ListOrdersArgs),
    Show(show::ShowOrderArgs),
    Advance(advance::AdvanceOrderArgs),
    Edit(edit::EditOrderArgs),
    Bulk(bulk::BulkOrdersArgs),
    Delete(delete::DeleteOrderArgs),
}

pub(crate) async fn run(command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::List(args) => list::run(args).await,
        OrdersSubcommand::Show(args) => show::run(args).await,
        OrdersSubcommand::Advance(args) => advance::run(args).await,
        OrdersSubcommand::Edit(args) => edit::run(args).await,
        OrdersSubcommand::Bulk(args) => bulk::run(args).await,
        OrdersSubcommand::Delete(args) => delete::run(args).await,
    }
}

fn desk(api: &ApiSettings) -> Result<OrderDesk, String> {
    AppContext::from_settings(api)
        .map(|context| context.desk())
        .map_err(|error| format!("failed to connect to backend: {error}"))
}
