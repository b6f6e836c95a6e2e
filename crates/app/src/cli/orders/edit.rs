use clap::Args;
use petlor::{ids::OrderId, orders::status::OrderStatus};
use petlor_app::config::ApiSettings;

#[derive(Debug, Args)]
pub(crate) struct EditOrderArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Order id
    id: OrderId,

    /// New status; any status may be set here
    #[arg(long)]
    status: OrderStatus,

    /// New shipping address
    #[arg(long)]
    address: Option<String>,
}

pub(crate) async fn run(args: EditOrderArgs) -> Result<(), String> {
    let desk = super::desk(&args.api)?;

    desk.admin_edit(args.id, args.status, args.address)
        .await
        .map_err(|error| format!("failed to update order {}: {error}", args.id))?;

    println!("order {} is now {}", args.id, args.status.label());

    Ok(())
}
