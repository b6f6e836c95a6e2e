//! Voucher Records

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use petlor::{
    money,
    vouchers::{DiscountKind, Voucher, VoucherCode},
};

use crate::vouchers::VouchersServiceError;

/// Body of `POST /khuyen-mai/kiem-tra`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateRequest<'a> {
    pub ma_code: &'a str,
    pub gia_tri_don_hang: i64,
}

/// Answer of `POST /khuyen-mai/kiem-tra`, either flat or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateResponse {
    #[serde(default)]
    pub so_tien_giam: Option<Decimal>,
    #[serde(default)]
    pub data: Option<ValidateData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateData {
    #[serde(default)]
    pub so_tien_giam: Option<Decimal>,
}

impl ValidateResponse {
    /// Discount in đồng; zero when the backend gave none.
    pub fn discount(&self) -> Decimal {
        self.so_tien_giam
            .or_else(|| self.data.as_ref().and_then(|data| data.so_tien_giam))
            .unwrap_or_default()
    }
}

/// Voucher row as listed by `GET /khuyen-mai`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRecord {
    pub ma_code: String,
    pub loai_giam_gia: DiscountKind,
    pub gia_tri_giam: Decimal,
    #[serde(default)]
    pub don_toi_thieu: Option<Decimal>,
    #[serde(default)]
    pub so_luong_gioi_han: Option<i64>,
    #[serde(default)]
    pub ngay_bat_dau: Option<DateTime>,
    #[serde(default)]
    pub ngay_ket_thuc: Option<DateTime>,
    #[serde(default)]
    pub trang_thai: Option<bool>,
}

impl TryFrom<VoucherRecord> for Voucher {
    type Error = VouchersServiceError;

    fn try_from(record: VoucherRecord) -> Result<Self, Self::Error> {
        Ok(Voucher {
            code: VoucherCode::parse(&record.ma_code)?,
            kind: record.loai_giam_gia,
            value: record.gia_tri_giam,
            minimum_order: record
                .don_toi_thieu
                .map_or_else(|| Ok(money::zero()), money::from_decimal)?,
            usage_limit: record.so_luong_gioi_han,
            starts_at: record.ngay_bat_dau,
            ends_at: record.ngay_ket_thuc,
            active: record.trang_thai.unwrap_or(true),
        })
    }
}
