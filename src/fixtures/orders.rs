//! Order Fixtures

use serde::Deserialize;

use crate::orders::OrderRecord;

/// Orders in YAML, written in the backend's row shape
#[derive(Debug, Deserialize)]
pub struct OrdersFixture {
    /// Order rows
    pub orders: Vec<OrderRecord>,
}
