//! Cart Records

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use petlor::{
    cart::{Cart, CartLine},
    ids::{CartLineId, ProductId},
    money,
};

use crate::carts::CartsServiceError;

/// Member cart as returned by `GET /gio-hang/me`.
#[derive(Debug, Deserialize)]
pub struct CartRecord {
    #[serde(default)]
    pub items: Vec<CartItemRecord>,
}

/// Cart line as returned by the backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRecord {
    pub id: CartLineId,
    pub san_pham_id: ProductId,
    #[serde(default)]
    pub ten_san_pham: Option<String>,
    pub don_gia: Decimal,
    pub so_luong: u32,
    pub ngay_them: DateTime,
}

/// Body of `PUT /gio-hang/me/update/{sanPhamId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuantityRequest {
    pub so_luong: u32,
}

impl TryFrom<CartRecord> for Cart {
    type Error = CartsServiceError;

    fn try_from(record: CartRecord) -> Result<Self, Self::Error> {
        let lines = record
            .items
            .into_iter()
            .map(|item| -> Result<CartLine, CartsServiceError> {
                let name = item
                    .ten_san_pham
                    .unwrap_or_else(|| format!("Sản phẩm {}", item.san_pham_id));

                Ok(CartLine::new(
                    item.id,
                    item.san_pham_id,
                    name,
                    money::from_decimal(item.don_gia)?,
                    item.so_luong,
                    item.ngay_them,
                )?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cart::with_lines(lines)?)
    }
}
