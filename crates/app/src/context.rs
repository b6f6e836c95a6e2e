//! App Context

use std::sync::Arc;

use thiserror::Error;

use petlor::checkout::dispatch::Buyer;

use crate::{
    api::{ApiClient, ApiError},
    carts::{CartsService, HttpCartsService},
    config::ApiSettings,
    desk::OrderDesk,
    orders::{HttpOrdersService, OrdersService},
    storefront::Storefront,
    vouchers::{HttpVouchersService, VouchersService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build HTTP client")]
    Client(#[source] ApiError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub vouchers: Arc<dyn VouchersService>,
    pub orders: Arc<dyn OrdersService>,
    pub buyer: Buyer,
}

impl AppContext {
    /// Build application context from backend settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, AppInitError> {
        let api = ApiClient::new(settings.api_config()).map_err(AppInitError::Client)?;

        Ok(Self {
            carts: Arc::new(HttpCartsService::new(api.clone())),
            vouchers: Arc::new(HttpVouchersService::new(api.clone())),
            orders: Arc::new(HttpOrdersService::new(api)),
            buyer: settings.buyer(),
        })
    }

    /// Buyer-side session over these services.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        Storefront::new(
            Arc::clone(&self.carts),
            Arc::clone(&self.vouchers),
            Arc::clone(&self.orders),
            self.buyer,
        )
    }

    /// Staff-side order desk over these services.
    #[must_use]
    pub fn desk(&self) -> OrderDesk {
        OrderDesk::new(Arc::clone(&self.orders))
    }
}
