//! Petlor
//!
//! Cart-to-order pricing and fulfillment rules for the PetLor storefront: which
//! cart lines are checked out, how a voucher discount is held and invalidated,
//! what the buyer pays, how an order is created and paid, and how staff move
//! orders through their fulfillment states.

pub mod cart;
pub mod checkout;
pub mod fixtures;
pub mod ids;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod receipt;
pub mod vouchers;
