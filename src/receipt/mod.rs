//! Receipt
//!
//! Terminal tables for the checkout summary, the order list and the voucher
//! catalogue.

use std::{fmt::Write as _, io, ops::Range};

use jiff::civil::DateTime;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartLine,
    checkout::session::CheckoutSummary,
    money::{Amount, PricingError},
    orders::{Order, stats::OrderStats, transitions::quick_action},
    vouchers::{DiscountKind, Voucher, VoucherCode},
};

/// Errors that can occur while rendering tables.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write output")]
    IO,

    /// A line total could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Write the selected lines and the checkout summary.
///
/// # Errors
///
/// Returns an error if a line cannot be priced or the output cannot be written.
pub fn write_checkout(
    mut out: impl io::Write,
    lines: &[&CartLine],
    summary: &CheckoutSummary,
    voucher: Option<&VoucherCode>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Product", "Unit Price", "Qty", "Line Total"]);

    for (idx, line) in lines.iter().enumerate() {
        builder.push_record([
            format!("#{}", idx + 1),
            line.name().to_string(),
            line.unit_price().to_string(),
            line.quantity().to_string(),
            line.line_total()?.to_string(),
        ]);
    }

    write_table(&mut out, builder, 2..5)?;

    let discount_label = voucher.map_or_else(|| " Discount:".to_string(), |code| format!(" Discount ({code}):"));

    let rows = [
        (" Subtotal:".to_string(), format!("{}  ", summary.subtotal)),
        (discount_label, format!("-{}  ", summary.discount)),
        (" Shipping:".to_string(), format!("{}  ", summary.shipping)),
        (
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", summary.total),
        ),
    ];

    write_summary(&mut out, &rows)
}

/// Write a page of orders with the page statistics.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_orders(
    mut out: impl io::Write,
    orders: &[Order],
    stats: &OrderStats,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Order", "Customer", "Address", "Status", "Total", "Next"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.customer_name.clone(),
            order.address.clone(),
            order.status.label().to_string(),
            order.total.to_string(),
            quick_action(order.status).map_or_else(String::new, |action| action.label.to_string()),
        ]);
    }

    write_table(&mut out, builder, 4..5)?;

    let rows = [
        (" Orders:".to_string(), format!("{}  ", stats.total_elements)),
        (" Pending:".to_string(), format!("{}  ", stats.pending)),
        (" Revenue:".to_string(), format!("{}  ", stats.revenue)),
    ];

    write_summary(&mut out, &rows)
}

/// Write the voucher catalogue, with an eligibility estimate for `subtotal`.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_vouchers(
    mut out: impl io::Write,
    vouchers: &[Voucher],
    subtotal: &Amount,
    now: DateTime,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Code", "Discount", "Minimum", "Ends", "Estimate"]);

    for voucher in vouchers {
        let discount = match voucher.kind {
            DiscountKind::Percentage => format!("{}%", voucher.value.normalize()),
            DiscountKind::FixedAmount => voucher.value.normalize().to_string(),
        };

        let estimate = voucher
            .estimate_discount(subtotal, now)
            .map_or_else(|error| error.to_string(), |amount| format!("-{amount}"));

        builder.push_record([
            voucher.code.to_string(),
            discount,
            voucher.minimum_order.to_string(),
            voucher
                .ends_at
                .map_or_else(String::new, |ends| ends.date().to_string()),
            estimate,
        ]);
    }

    write_table(&mut out, builder, 1..3)?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: Range<usize>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, rows: &[(String, String)]) -> Result<(), ReceiptError> {
    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in dark grey.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}
