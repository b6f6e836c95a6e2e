//! Carts

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use thiserror::Error;

use petlor::{
    cart::{Cart, CartError},
    ids::ProductId,
    money::PricingError,
};

use crate::{
    api::{ApiClient, ApiError},
    carts::records::{CartRecord, QuantityRequest},
};

pub mod records;

/// Carts service errors.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("backend returned an invalid cart")]
    InvalidCart(#[from] CartError),

    #[error("backend returned an invalid price")]
    InvalidPrice(#[from] PricingError),
}

#[derive(Debug, Clone)]
pub struct HttpCartsService {
    api: ApiClient,
}

impl HttpCartsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CartsService for HttpCartsService {
    async fn get_cart(&self) -> Result<Cart, CartsServiceError> {
        let record: CartRecord = self
            .api
            .send_json(self.api.request(Method::GET, "/gio-hang/me"))
            .await?;

        record.try_into()
    }

    async fn update_quantity(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartsServiceError> {
        let request = self
            .api
            .request(Method::PUT, &format!("/gio-hang/me/update/{product}"))
            .json(&QuantityRequest { so_luong: quantity });

        Ok(self.api.send_empty(request).await?)
    }

    async fn remove_product(&self, product: ProductId) -> Result<(), CartsServiceError> {
        let request = self
            .api
            .request(Method::DELETE, &format!("/gio-hang/me/remove/{product}"));

        Ok(self.api.send_empty(request).await?)
    }

    async fn clear_cart(&self) -> Result<(), CartsServiceError> {
        let request = self.api.request(Method::DELETE, "/gio-hang/me/clear");

        Ok(self.api.send_empty(request).await?)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the signed-in member's cart.
    async fn get_cart(&self) -> Result<Cart, CartsServiceError>;

    /// Set the quantity of `product` in the cart.
    async fn update_quantity(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartsServiceError>;

    /// Remove `product` from the cart.
    async fn remove_product(&self, product: ProductId) -> Result<(), CartsServiceError>;

    /// Remove every line from the cart.
    async fn clear_cart(&self) -> Result<(), CartsServiceError>;
}
