//! Fixtures
//!
//! YAML fixtures for carts, vouchers and orders, read from
//! `{base}/{kind}/{name}.yml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    cart::CartError,
    fixtures::{carts::CartFixture, orders::OrdersFixture, vouchers::VouchersFixture},
    ids::CartLineId,
    money::PricingError,
    orders::{Order, OrderRecordError},
    vouchers::{Voucher, VoucherError},
};

pub mod carts;
pub mod orders;
pub mod vouchers;

pub use carts::CartSet;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Selected line missing from the cart
    #[error("Selected line {0} is not in the cart")]
    UnknownLine(CartLineId),

    /// Invalid cart
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Invalid voucher
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Unrepresentable amount
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Unreadable order row
    #[error(transparent)]
    Order(#[from] OrderRecordError),
}

/// Fixture loader
#[derive(Debug, Clone)]
pub struct Fixture {
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a loader rooted at `./fixtures`
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a cart and its selection from `carts/{name}.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or describes an
    /// invalid cart.
    pub fn cart(&self, name: &str) -> Result<CartSet, FixtureError> {
        read_cart(self.path("carts", name))
    }

    /// Load vouchers from `vouchers/{name}.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn vouchers(&self, name: &str) -> Result<Vec<Voucher>, FixtureError> {
        read_yaml::<VouchersFixture>(&self.path("vouchers", name))?
            .vouchers
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Load orders from `orders/{name}.yml`, in the backend's row shape
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn orders(&self, name: &str) -> Result<Vec<Order>, FixtureError> {
        read_yaml::<OrdersFixture>(&self.path("orders", name))?
            .orders
            .into_iter()
            .map(|record| -> Result<Order, FixtureError> { Ok(record.into_order()?) })
            .collect()
    }

    fn path(&self, kind: &str, name: &str) -> PathBuf {
        self.base_path.join(kind).join(format!("{name}.yml"))
    }
}

/// Load a cart fixture from an explicit path
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or describes an
/// invalid cart.
pub fn read_cart(path: impl AsRef<Path>) -> Result<CartSet, FixtureError> {
    read_yaml::<CartFixture>(path.as_ref())?.try_into()
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, FixtureError> {
    let contents = fs::read_to_string(path)?;

    Ok(serde_norway::from_str(&contents)?)
}
