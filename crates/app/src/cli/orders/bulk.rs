use clap::Args;
use petlor::{
    ids::OrderId,
    orders::{page::OrderQuery, status::OrderStatus},
};
use petlor_app::config::ApiSettings;

#[derive(Debug, Args)]
pub(crate) struct BulkOrdersArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Status to move the orders forward to
    #[arg(long)]
    to: OrderStatus,

    /// Page the orders are picked from
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    size: u32,

    /// Orders to move; every open order on the page when omitted
    ids: Vec<OrderId>,
}

pub(crate) async fn run(args: BulkOrdersArgs) -> Result<(), String> {
    let desk = super::desk(&args.api)?;

    desk.load(OrderQuery {
        page: args.page,
        size: args.size,
        ..OrderQuery::default()
    })
    .await
    .map_err(|error| format!("failed to list orders: {error}"))?;

    if args.ids.is_empty() {
        desk.select_all(true).map_err(|error| error.to_string())?;
    } else {
        for id in &args.ids {
            if !desk.toggle(*id).map_err(|error| error.to_string())? {
                println!("order {id} is closed and was not picked");
            }
        }
    }

    let report = desk
        .bulk_transition_selected(args.to)
        .await
        .map_err(|error| format!("bulk update failed: {error}"))?;

    for id in &report.succeeded {
        println!("order {id}: {}", args.to.label());
    }

    for id in &report.skipped {
        println!("order {id}: skipped");
    }

    for (id, reason) in &report.failed {
        println!("order {id}: failed ({reason})");
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} of the updates failed", report.failed.len()))
    }
}
