use std::{io, path::PathBuf};

use clap::Args;
use petlor::{
    fixtures, money, receipt,
    vouchers::engine::ValidationOutcome,
};

#[derive(Debug, Args)]
pub(crate) struct PreviewArgs {
    /// Cart fixture (YAML) with the lines and the ticked selection
    cart: PathBuf,

    /// Voucher code to hold against the selection
    #[arg(long, requires = "discount")]
    voucher: Option<String>,

    /// Discount in đồng the voucher gives, as the validator would answer
    #[arg(long, requires = "voucher")]
    discount: Option<i64>,
}

pub(crate) fn run(args: PreviewArgs) -> Result<(), String> {
    let mut session = fixtures::read_cart(&args.cart)
        .and_then(fixtures::CartSet::into_session)
        .map_err(|error| format!("failed to load {}: {error}", args.cart.display()))?;

    let mut held = None;

    if let (Some(raw_code), Some(discount)) = (args.voucher.as_deref(), args.discount) {
        let ticket = session
            .begin_voucher(raw_code)
            .map_err(|error| error.to_string())?;

        let applied = session
            .complete_voucher(ticket, ValidationOutcome::Discount(money::vnd(discount)))
            .map_err(|error| error.to_string())?;

        held = Some(applied.code().clone());
    }

    let summary = session.summary().map_err(|error| error.to_string())?;
    let lines = session.store().selected_newest_first();

    if lines.is_empty() {
        println!("no lines selected");
    }

    receipt::write_checkout(io::stdout(), &lines, &summary, held.as_ref())
        .map_err(|error| format!("failed to print checkout: {error}"))
}
