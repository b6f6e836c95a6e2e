//! Voucher Fixtures

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    money,
    vouchers::{DiscountKind, Voucher, VoucherCode},
};

/// Vouchers in YAML
#[derive(Debug, Deserialize)]
pub struct VouchersFixture {
    /// Voucher list
    pub vouchers: Vec<VoucherFixture>,
}

/// Voucher in YAML
#[derive(Debug, Deserialize)]
pub struct VoucherFixture {
    /// Code, normalised on load
    pub code: String,

    /// `SO_TIEN` or `PHAN_TRAM`
    pub kind: DiscountKind,

    /// Amount or percentage
    pub value: Decimal,

    /// Minimum order value in đồng
    #[serde(default)]
    pub minimum_order: Decimal,

    /// Remaining uses
    #[serde(default)]
    pub usage_limit: Option<i64>,

    /// Window start
    #[serde(default)]
    pub starts_at: Option<DateTime>,

    /// Window end
    #[serde(default)]
    pub ends_at: Option<DateTime>,

    /// Operator switch
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl TryFrom<VoucherFixture> for Voucher {
    type Error = FixtureError;

    fn try_from(fixture: VoucherFixture) -> Result<Self, Self::Error> {
        Ok(Voucher {
            code: VoucherCode::parse(&fixture.code)?,
            kind: fixture.kind,
            value: fixture.value,
            minimum_order: money::from_decimal(fixture.minimum_order)?,
            usage_limit: fixture.usage_limit,
            starts_at: fixture.starts_at,
            ends_at: fixture.ends_at,
            active: fixture.active,
        })
    }
}
