use clap::Args;
use petlor::{money, vouchers::VoucherCode};
use petlor_app::{config::ApiSettings, context::AppContext, storefront::VOUCHER_FAILED};

#[derive(Debug, Args)]
pub(crate) struct CheckVoucherArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Voucher code; case and surrounding spaces are ignored
    code: String,

    /// Order value in đồng the code is checked against
    order_value: i64,
}

pub(crate) async fn run(args: CheckVoucherArgs) -> Result<(), String> {
    let code = VoucherCode::parse(&args.code).map_err(|error| error.to_string())?;

    let context = AppContext::from_settings(&args.api)
        .map_err(|error| format!("failed to connect to backend: {error}"))?;

    let discount = context
        .vouchers
        .validate(code.clone(), money::vnd(args.order_value))
        .await
        .map_err(|error| error.user_message(VOUCHER_FAILED))?;

    if discount.is_zero() {
        return Err(format!("{code} gives no discount on this order"));
    }

    println!("{code}: -{discount}");

    Ok(())
}
