//! Backend services and operator workflows for the PetLor storefront.
//!
//! [`storefront::Storefront`] drives the buyer side from cart to order;
//! [`desk::OrderDesk`] drives the staff side of order fulfillment. Both talk to
//! the backend through the services built by [`context::AppContext`].

pub mod api;
pub mod carts;
pub mod config;
pub mod context;
pub mod desk;
pub mod observability;
pub mod orders;
pub mod storefront;
pub mod vouchers;
