use clap::Args;
use petlor::ids::OrderId;
use petlor_app::config::ApiSettings;

#[derive(Debug, Args)]
pub(crate) struct AdvanceOrderArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Order id
    id: OrderId,
}

pub(crate) async fn run(args: AdvanceOrderArgs) -> Result<(), String> {
    let desk = super::desk(&args.api)?;

    let status = desk
        .quick_advance(args.id)
        .await
        .map_err(|error| format!("failed to advance order {}: {error}", args.id))?;

    println!("order {} is now {}", args.id, status.label());

    Ok(())
}
