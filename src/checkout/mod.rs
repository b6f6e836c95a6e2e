//! Checkout
//!
//! From the buyer's selection to a creatable order: the session that ties the
//! cart selection to the voucher engine, the payable total, the order draft and
//! the post-creation payment step.

use thiserror::Error;

use crate::{
    cart::CartError,
    checkout::dispatch::ShippingField,
    money::PricingError,
    vouchers::VoucherError,
};

pub mod dispatch;
pub mod payment;
pub mod session;
pub mod total;

/// Errors raised while checking out.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// No cart line is selected.
    #[error("select at least one product to check out")]
    EmptySelection,

    /// Mandatory shipping fields are blank.
    #[error("please fill in: {}", list_fields(.0))]
    MissingFields(Vec<ShippingField>),

    /// Guests can only pay online.
    #[error("cash on delivery is only available to signed-in customers")]
    GuestCodUnsupported,

    /// Payment can only be confirmed while a QR payment is showing.
    #[error("no payment is awaiting confirmation")]
    NotAwaitingPayment,

    /// Wrapped cart error.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped voucher error.
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

fn list_fields(fields: &[ShippingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
