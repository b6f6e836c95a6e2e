//! Checkout Total Calculator

use crate::money::{self, Amount};

/// Flat shipping fee in đồng.
pub const SHIPPING_FEE_VND: i64 = 30_000;

/// The flat shipping fee.
pub fn shipping_fee() -> Amount {
    money::vnd(SHIPPING_FEE_VND)
}

/// `max(0, subtotal - discount) + shipping`.
///
/// The discounted part never goes below zero, so the result is never less than
/// `shipping` for a non-negative fee.
pub fn total(subtotal: &Amount, discount: &Amount, shipping: &Amount) -> Amount {
    let discounted = subtotal
        .to_minor_units()
        .saturating_sub(discount.to_minor_units())
        .max(0);

    money::vnd(discounted.saturating_add(shipping.to_minor_units()))
}
