use std::io;

use clap::Args;
use jiff::Zoned;
use petlor::{money, receipt};
use petlor_app::{config::ApiSettings, context::AppContext};

#[derive(Debug, Args)]
pub(crate) struct ListVouchersArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Order subtotal in đồng to estimate each discount against
    #[arg(long, default_value_t = 0)]
    subtotal: i64,

    /// Include vouchers that are locked, expired or used up
    #[arg(long)]
    all: bool,
}

pub(crate) async fn run(args: ListVouchersArgs) -> Result<(), String> {
    let context = AppContext::from_settings(&args.api)
        .map_err(|error| format!("failed to connect to backend: {error}"))?;

    let now = Zoned::now().datetime();

    let vouchers: Vec<_> = context
        .vouchers
        .list_vouchers()
        .await
        .map_err(|error| format!("failed to list vouchers: {error}"))?
        .into_iter()
        .filter(|voucher| args.all || voucher.is_displayable(now))
        .collect();

    if vouchers.is_empty() {
        println!("no vouchers available");
        return Ok(());
    }

    receipt::write_vouchers(io::stdout(), &vouchers, &money::vnd(args.subtotal), now)
        .map_err(|error| format!("failed to print vouchers: {error}"))
}
