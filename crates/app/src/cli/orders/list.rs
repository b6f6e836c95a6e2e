use std::io;

use clap::Args;
use jiff::civil::Date;
use petlor::{
    orders::{
        page::{OrderQuery, SortOrder},
        status::OrderStatus,
    },
    receipt,
};
use petlor_app::config::ApiSettings;

#[derive(Debug, Args)]
pub(crate) struct ListOrdersArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    size: u32,

    /// Free-text search over customer, phone and address
    #[arg(long)]
    search: Option<String>,

    /// Only orders in this status, e.g. "Chờ xử lý" or DANG_GIAO
    #[arg(long)]
    status: Option<OrderStatus>,

    /// Only orders placed on this date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<Date>,

    /// Sort order as key,direction, e.g. ngayDatHang,desc
    #[arg(long)]
    sort: Option<SortOrder>,
}

pub(crate) async fn run(args: ListOrdersArgs) -> Result<(), String> {
    let desk = super::desk(&args.api)?;

    let page = desk
        .load(OrderQuery {
            page: args.page,
            size: args.size,
            search: args.search,
            status: args.status,
            date: args.date,
            sort: args.sort,
        })
        .await
        .map_err(|error| format!("failed to list orders: {error}"))?;

    if page.items.is_empty() {
        println!("no orders found");
        return Ok(());
    }

    let stats = desk
        .stats()
        .map_err(|error| format!("failed to summarise orders: {error}"))?;

    receipt::write_orders(io::stdout(), &page.items, &stats)
        .map_err(|error| format!("failed to print orders: {error}"))?;

    println!("page {} of {}", page.number + 1, page.total_pages.max(1));

    Ok(())
}
