use clap::Args;
use petlor::ids::OrderId;
use petlor_app::config::ApiSettings;

#[derive(Debug, Args)]
pub(crate) struct DeleteOrderArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Order id
    id: OrderId,
}

pub(crate) async fn run(args: DeleteOrderArgs) -> Result<(), String> {
    let desk = super::desk(&args.api)?;

    desk.delete(args.id)
        .await
        .map_err(|error| format!("failed to delete order {}: {error}", args.id))?;

    println!("order {} deleted", args.id);

    Ok(())
}
