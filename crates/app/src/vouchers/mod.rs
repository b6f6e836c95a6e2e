//! Vouchers

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use thiserror::Error;

use petlor::{
    money::{self, Amount, PricingError},
    orders::page::ListEnvelope,
    vouchers::{Voucher, VoucherCode, VoucherError},
};

use crate::{
    api::{ApiClient, ApiError},
    vouchers::records::{ValidateRequest, ValidateResponse, VoucherRecord},
};

pub mod records;

const CATALOGUE_PAGE_SIZE: u32 = 20;

/// Vouchers service errors.
#[derive(Debug, Error)]
pub enum VouchersServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("backend returned an invalid voucher")]
    InvalidVoucher(#[from] VoucherError),

    #[error("backend returned an invalid amount")]
    InvalidAmount(#[from] PricingError),
}

impl VouchersServiceError {
    /// The server's message when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(error) => error.user_message(fallback),
            Self::InvalidVoucher(_) | Self::InvalidAmount(_) => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpVouchersService {
    api: ApiClient,
}

impl HttpVouchersService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl VouchersService for HttpVouchersService {
    async fn validate(
        &self,
        code: VoucherCode,
        order_value: Amount,
    ) -> Result<Amount, VouchersServiceError> {
        let request = self
            .api
            .request(Method::POST, "/khuyen-mai/kiem-tra")
            .json(&ValidateRequest {
                ma_code: code.as_str(),
                gia_tri_don_hang: order_value.to_minor_units(),
            });

        let response: ValidateResponse = self.api.send_json(request).await?;

        Ok(money::from_decimal(response.discount())?)
    }

    async fn list_vouchers(&self) -> Result<Vec<Voucher>, VouchersServiceError> {
        let request = self
            .api
            .request(Method::GET, "/khuyen-mai")
            .query(&[("page", 0), ("size", CATALOGUE_PAGE_SIZE)]);

        let envelope: ListEnvelope<VoucherRecord> = self.api.send_json(request).await?;

        envelope
            .into_items()
            .into_iter()
            .map(Voucher::try_from)
            .collect()
    }
}

#[automock]
#[async_trait]
pub trait VouchersService: Send + Sync {
    /// Ask the backend how much `code` takes off an order worth `order_value`.
    ///
    /// A zero amount means the code is valid but gives no discount.
    async fn validate(
        &self,
        code: VoucherCode,
        order_value: Amount,
    ) -> Result<Amount, VouchersServiceError>;

    /// First page of the voucher catalogue.
    async fn list_vouchers(&self) -> Result<Vec<Voucher>, VouchersServiceError>;
}
