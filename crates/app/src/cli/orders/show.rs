use clap::Args;
use petlor::ids::OrderId;
use petlor_app::config::ApiSettings;

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    #[command(flatten)]
    api: ApiSettings,

    /// Order id
    id: OrderId,
}

pub(crate) async fn run(args: ShowOrderArgs) -> Result<(), String> {
    let desk = super::desk(&args.api)?;

    let order = desk
        .order(args.id)
        .await
        .map_err(|error| format!("failed to fetch order {}: {error}", args.id))?;

    println!("order_id: {}", order.id);
    println!("customer: {}", order.customer_name);
    println!(
        "recipient: {}",
        order.recipient_name.as_deref().unwrap_or("-")
    );
    println!("phone: {}", order.phone.as_deref().unwrap_or("-"));
    println!("address: {}", order.address);
    println!("status: {}", order.status.label());
    println!(
        "payment: {}",
        order
            .payment_method
            .map_or_else(|| "-".to_string(), |method| method.to_string())
    );
    println!(
        "voucher: {}",
        order
            .voucher_code
            .as_ref()
            .map_or("-", |code| code.as_str())
    );
    println!(
        "placed_at: {}",
        order
            .placed_at
            .map_or_else(|| "-".to_string(), |value| value.to_string())
    );
    println!("total: {}", order.total);

    for line in &order.lines {
        println!(
            "  {} x{} {}",
            line.product_name
                .clone()
                .unwrap_or_else(|| format!("#{}", line.product_id)),
            line.quantity,
            line.unit_price
                .as_ref()
                .map_or_else(String::new, ToString::to_string)
        );
    }

    Ok(())
}
