//! Order Records

use serde::{Deserialize, Serialize};

use petlor::{
    checkout::{
        dispatch::{CreationRoute, OrderDraft},
        payment::PaymentMethod,
    },
    ids::{OrderId, ProductId, UserId},
};

/// Body of `POST /don-hang` and `POST /don-hang/guest`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest<'a> {
    pub ho_ten_nguoi_nhan: &'a str,
    pub so_dien_thoai_nhan: &'a str,
    pub dia_chi_giao_hang: &'a str,
    pub tinh_thanh: &'a str,
    pub quan_huyen: &'a str,
    pub phuong_xa: &'a str,
    pub phuong_thuc_thanh_toan: PaymentMethod,
    pub ma_khuyen_mai: Option<&'a str>,
    pub chi_tiet_don_hangs: Vec<CreateOrderLine>,
    pub ghi_chu: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderLine {
    pub san_pham_id: ProductId,
    pub so_luong: u32,
}

impl<'a> From<&'a OrderDraft> for CreateOrderRequest<'a> {
    fn from(draft: &'a OrderDraft) -> Self {
        let (user_id, email) = match draft.route {
            CreationRoute::Member(user_id) => (Some(user_id), None),
            CreationRoute::Guest => (None, Some(draft.details.email.as_str())),
        };

        Self {
            ho_ten_nguoi_nhan: &draft.details.recipient_name,
            so_dien_thoai_nhan: &draft.details.phone,
            dia_chi_giao_hang: &draft.details.street_address,
            tinh_thanh: &draft.details.province,
            quan_huyen: &draft.details.district,
            phuong_xa: &draft.details.ward,
            phuong_thuc_thanh_toan: draft.payment_method,
            ma_khuyen_mai: draft.voucher_code.as_ref().map(|code| code.as_str()),
            chi_tiet_don_hangs: draft
                .lines
                .iter()
                .map(|line| CreateOrderLine {
                    san_pham_id: line.product_id,
                    so_luong: line.quantity,
                })
                .collect(),
            ghi_chu: draft.note.as_deref(),
            user_id,
            email,
        }
    }
}

/// Answer of an order creation request.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedOrderRecord {
    #[serde(default, alias = "donHangId")]
    pub id: Option<OrderId>,
}
