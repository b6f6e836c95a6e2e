//! Orders
//!
//! Orders as the back office sees them. [`OrderRecord`] is the loose row shape
//! the backend returns (several field spellings, most fields optional);
//! [`OrderRecord::into_order`] settles it into an [`Order`] with defaults filled
//! in and the status canonicalised.

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    checkout::payment::PaymentMethod,
    ids::{OrderId, ProductId, UserId},
    money::{self, Amount, PricingError},
    orders::status::{OrderStatus, StatusError},
    vouchers::VoucherCode,
};

pub mod page;
pub mod stats;
pub mod status;
pub mod transitions;

/// Name shown for orders without a customer.
pub const WALK_IN_CUSTOMER: &str = "Khách vãng lai";

/// Address shown for orders without a delivery address.
pub const IN_STORE_ADDRESS: &str = "Tại cửa hàng";

/// A backend order row that cannot be settled into an [`Order`].
#[derive(Debug, Error, PartialEq)]
pub enum OrderRecordError {
    #[error("order {id}: {source}")]
    Status {
        id: OrderId,
        #[source]
        source: StatusError,
    },

    #[error("order {id}: {source}")]
    Amount {
        id: OrderId,
        #[source]
        source: PricingError,
    },
}

impl OrderRecordError {
    /// The offending row.
    pub fn id(&self) -> OrderId {
        match self {
            Self::Status { id, .. } | Self::Amount { id, .. } => *id,
        }
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Product
    pub product_id: ProductId,

    /// Product name at the time of the order, when provided
    pub product_name: Option<String>,

    /// Units
    pub quantity: u32,

    /// Unit price charged, when provided
    pub unit_price: Option<Amount>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Order id
    pub id: OrderId,

    /// Name shown in order lists
    pub customer_name: String,

    /// Recipient name on the shipping form
    pub recipient_name: Option<String>,

    /// Recipient phone
    pub phone: Option<String>,

    /// Contact email (guest orders)
    pub email: Option<String>,

    /// Street address
    pub address: String,

    /// Province, district and ward, when provided
    pub region: Option<String>,

    /// Payment method, when recognised
    pub payment_method: Option<PaymentMethod>,

    /// Redeemed voucher
    pub voucher_code: Option<VoucherCode>,

    /// Ordered lines
    pub lines: Vec<OrderLine>,

    /// Canonical status
    pub status: OrderStatus,

    /// When the order was placed
    pub placed_at: Option<DateTime>,

    /// Registered owner, `None` for guest orders
    pub owner: Option<UserId>,

    /// Amount charged
    pub total: Amount,
}

impl Order {
    /// Whether the order was placed without an account.
    pub fn is_guest(&self) -> bool {
        self.owner.is_none()
    }
}

/// Order row as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// `id` or `donHangId`
    #[serde(alias = "donHangId")]
    pub id: OrderId,

    /// Account display name
    #[serde(default)]
    pub ten_nguoi_dung: Option<String>,

    /// Nested account
    #[serde(default)]
    pub user: Option<UserRecord>,

    /// Recipient name
    #[serde(default)]
    pub ho_ten_nguoi_nhan: Option<String>,

    /// Recipient phone
    #[serde(default)]
    pub so_dien_thoai_nhan: Option<String>,

    /// Guest email
    #[serde(default)]
    pub email: Option<String>,

    /// Delivery address
    #[serde(default)]
    pub dia_chi_giao_hang: Option<String>,

    /// Delivery address, staff spelling
    #[serde(default)]
    pub dia_chi: Option<String>,

    /// Province
    #[serde(default)]
    pub tinh_thanh: Option<String>,

    /// District
    #[serde(default)]
    pub quan_huyen: Option<String>,

    /// Ward
    #[serde(default)]
    pub phuong_xa: Option<String>,

    /// Payment method code
    #[serde(default)]
    pub phuong_thuc_thanh_toan: Option<String>,

    /// Voucher code
    #[serde(default)]
    pub ma_khuyen_mai: Option<String>,

    /// Lines
    #[serde(default)]
    pub chi_tiet_don_hangs: Vec<OrderLineRecord>,

    /// Status, in either vocabulary. Canonicalised by [`OrderRecord::into_order`]
    #[serde(default)]
    pub trang_thai_don_hang: Option<String>,

    /// Status, staff spelling
    #[serde(default)]
    pub trang_thai: Option<String>,

    /// Placement time
    #[serde(default)]
    pub ngay_dat_hang: Option<DateTime>,

    /// Placement time, staff spelling
    #[serde(default)]
    pub ngay_tao: Option<DateTime>,

    /// Owner id
    #[serde(default)]
    pub user_id: Option<UserId>,

    /// Amount charged
    #[serde(default)]
    pub tong_tien: Option<Decimal>,

    /// Amount charged, staff spelling
    #[serde(default)]
    pub tong_thanh_toan: Option<Decimal>,
}

/// Nested account on an order row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Account id
    #[serde(default)]
    pub id: Option<UserId>,

    /// Full name
    #[serde(default)]
    pub ho_ten: Option<String>,
}

/// Order line as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRecord {
    /// Product
    pub san_pham_id: ProductId,

    /// Product name
    #[serde(default)]
    pub ten_san_pham: Option<String>,

    /// Units
    pub so_luong: u32,

    /// Unit price
    #[serde(default)]
    pub don_gia: Option<Decimal>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl OrderRecord {
    /// Settle the row into an [`Order`].
    ///
    /// # Errors
    ///
    /// Returns an [`OrderRecordError`] naming the row if its status is not a
    /// known spelling or an amount cannot be represented in đồng.
    pub fn into_order(self) -> Result<Order, OrderRecordError> {
        let id = self.id;
        let amount = |source: PricingError| OrderRecordError::Amount { id, source };

        let status = non_blank(self.trang_thai_don_hang)
            .or_else(|| non_blank(self.trang_thai))
            .map(|raw| raw.parse::<OrderStatus>())
            .transpose()
            .map_err(|source| OrderRecordError::Status { id, source })?
            .unwrap_or(OrderStatus::Pending);

        let owner = self
            .user_id
            .or_else(|| self.user.as_ref().and_then(|user| user.id));

        let recipient_name = non_blank(self.ho_ten_nguoi_nhan);

        let customer_name = non_blank(self.ten_nguoi_dung)
            .or_else(|| self.user.and_then(|user| non_blank(user.ho_ten)))
            .or_else(|| recipient_name.clone())
            .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string());

        let region = [self.phuong_xa, self.quan_huyen, self.tinh_thanh]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>();

        let lines = self
            .chi_tiet_don_hangs
            .into_iter()
            .map(|line| -> Result<OrderLine, PricingError> {
                Ok(OrderLine {
                    product_id: line.san_pham_id,
                    product_name: line.ten_san_pham,
                    quantity: line.so_luong,
                    unit_price: line.don_gia.map(money::from_decimal).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(amount)?;

        Ok(Order {
            id,
            customer_name,
            recipient_name,
            phone: non_blank(self.so_dien_thoai_nhan),
            email: non_blank(self.email),
            address: non_blank(self.dia_chi_giao_hang)
                .or_else(|| non_blank(self.dia_chi))
                .unwrap_or_else(|| IN_STORE_ADDRESS.to_string()),
            region: (!region.is_empty()).then(|| region.join(", ")),
            payment_method: self
                .phuong_thuc_thanh_toan
                .and_then(|method| method.parse().ok()),
            voucher_code: self
                .ma_khuyen_mai
                .and_then(|code| VoucherCode::parse(&code).ok()),
            lines,
            status,
            placed_at: self.ngay_dat_hang.or(self.ngay_tao),
            owner,
            total: self
                .tong_tien
                .or(self.tong_thanh_toan)
                .map_or_else(|| Ok(money::zero()), money::from_decimal)
                .map_err(amount)?,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use testresult::TestResult;

    use crate::money::vnd;

    use super::*;

    pub(crate) fn order(id: i64, status: OrderStatus, total: i64) -> Order {
        Order {
            id: OrderId::new(id),
            customer_name: format!("Customer {id}"),
            recipient_name: None,
            phone: None,
            email: None,
            address: IN_STORE_ADDRESS.to_string(),
            region: None,
            payment_method: Some(PaymentMethod::Cod),
            voucher_code: None,
            lines: Vec::new(),
            status,
            placed_at: None,
            owner: Some(UserId::new(1)),
            total: vnd(total),
        }
    }

    #[test]
    fn admin_row_shape() -> TestResult {
        let record: OrderRecord = serde_json::from_str(
            r#"{
                "donHangId": 12,
                "tenNguoiDung": "Trần Thị B",
                "diaChiGiaoHang": "12 Lê Lợi",
                "trangThaiDonHang": "Đang giao",
                "tongTien": 480000.0,
                "phuongThucThanhToan": "MOMO",
                "userId": 3
            }"#,
        )?;

        let order = record.into_order()?;

        assert_eq!(order.id, OrderId::new(12));
        assert_eq!(order.customer_name, "Trần Thị B");
        assert_eq!(order.address, "12 Lê Lợi");
        assert_eq!(order.status, OrderStatus::Shipping);
        assert_eq!(order.total, vnd(480_000));
        assert_eq!(order.payment_method, Some(PaymentMethod::Momo));
        assert!(!order.is_guest());

        Ok(())
    }

    #[test]
    fn staff_row_shape() -> TestResult {
        let record: OrderRecord = serde_json::from_str(
            r#"{
                "id": 5,
                "hoTenNguoiNhan": "Lê C",
                "diaChi": "",
                "trangThai": "CHO_XU_LY",
                "tongThanhToan": 330000,
                "tinhThanh": "Hà Nội",
                "quanHuyen": "Ba Đình",
                "phuongXa": "Kim Mã",
                "chiTietDonHangs": [{"sanPhamId": 4, "soLuong": 2, "donGia": 150000}]
            }"#,
        )?;

        let order = record.into_order()?;

        assert_eq!(order.customer_name, "Lê C");
        assert_eq!(order.address, IN_STORE_ADDRESS);
        assert_eq!(order.region.as_deref(), Some("Kim Mã, Ba Đình, Hà Nội"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(
            order.lines.first().and_then(|line| line.unit_price),
            Some(vnd(150_000))
        );
        assert!(order.is_guest());

        Ok(())
    }

    #[test]
    fn bare_row_gets_defaults() -> TestResult {
        let record: OrderRecord = serde_json::from_str(r#"{"id": 1}"#)?;
        let order = record.into_order()?;

        assert_eq!(order.customer_name, WALK_IN_CUSTOMER);
        assert_eq!(order.address, IN_STORE_ADDRESS);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, vnd(0));

        Ok(())
    }

    #[test]
    fn unknown_status_names_the_row() -> TestResult {
        let record: OrderRecord =
            serde_json::from_str(r#"{"id": 8, "trangThai": "DOI_TRA", "tongTien": 1000}"#)?;

        let Err(error) = record.into_order() else {
            panic!("Expected an unknown status");
        };

        assert_eq!(error.id(), OrderId::new(8));
        assert_eq!(
            error,
            OrderRecordError::Status {
                id: OrderId::new(8),
                source: StatusError::Unknown("DOI_TRA".into()),
            }
        );

        Ok(())
    }

    #[test]
    fn nested_user_name_is_used() -> TestResult {
        let record: OrderRecord =
            serde_json::from_str(r#"{"id": 1, "user": {"id": 9, "hoTen": "Phạm D"}}"#)?;
        let order = record.into_order()?;

        assert_eq!(order.customer_name, "Phạm D");
        assert_eq!(order.owner, Some(UserId::new(9)));

        Ok(())
    }
}
