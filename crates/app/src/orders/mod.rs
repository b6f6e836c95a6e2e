//! Orders

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::warn;

use petlor::{
    checkout::dispatch::{CreationRoute, OrderDraft},
    ids::OrderId,
    orders::{
        Order, OrderRecord, OrderRecordError,
        page::{ListEnvelope, OrderQuery, Page},
        transitions::{StatusUpdate, UpdatePath},
    },
};

use crate::{
    api::{ApiClient, ApiError},
    orders::records::{CreateOrderRequest, CreatedOrderRecord},
};

pub mod records;

/// Orders service errors.
#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("order not found")]
    NotFound,

    #[error("backend returned an unreadable order")]
    InvalidOrder(#[from] OrderRecordError),
}

impl OrdersServiceError {
    /// The server's message when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(error) => error.user_message(fallback),
            Self::NotFound | Self::InvalidOrder(_) => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpOrdersService {
    api: ApiClient,
}

impl HttpOrdersService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn status_body(update: &StatusUpdate) -> Value {
    match update.path {
        UpdatePath::AdminEdit => {
            let mut body = Map::new();

            body.insert("trangThaiDonHang".into(), update.wire_status().into());

            if let Some(address) = &update.address {
                body.insert("diaChiGiaoHang".into(), address.clone().into());
            }

            Value::Object(body)
        }
        UpdatePath::QuickAdvance | UpdatePath::Bulk => {
            json!({ "trangThai": update.wire_status() })
        }
    }
}

#[async_trait]
impl OrdersService for HttpOrdersService {
    async fn create_order(&self, draft: OrderDraft) -> Result<Option<OrderId>, OrdersServiceError> {
        let path = match draft.route {
            CreationRoute::Member(_) => "/don-hang",
            CreationRoute::Guest => "/don-hang/guest",
        };

        let request = self
            .api
            .request(Method::POST, path)
            .json(&CreateOrderRequest::from(&draft));

        let created: Option<CreatedOrderRecord> = self.api.send_optional(request).await?;

        Ok(created.and_then(|record| record.id))
    }

    async fn list_orders(&self, query: OrderQuery) -> Result<Page<Order>, OrdersServiceError> {
        let request = self
            .api
            .request(Method::GET, "/don-hang")
            .query(&query.to_query_pairs());

        let envelope: ListEnvelope<OrderRecord> = self.api.send_json(request).await?;

        let (page, rejected) = envelope.into_page(&query).map_rows(OrderRecord::into_order);

        for error in rejected {
            warn!(order_id = %error.id(), %error, "skipped unreadable order row");
        }

        Ok(page)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, OrdersServiceError> {
        let request = self.api.request(Method::GET, &format!("/don-hang/{id}"));

        let record: OrderRecord = self.api.send_json(request).await.map_err(|error| {
            if error.is_not_found() {
                OrdersServiceError::NotFound
            } else {
                OrdersServiceError::Api(error)
            }
        })?;

        Ok(record.into_order()?)
    }

    async fn update_status(&self, update: StatusUpdate) -> Result<(), OrdersServiceError> {
        let request = self
            .api
            .request(Method::PUT, &format!("/don-hang/{}", update.order_id))
            .json(&status_body(&update));

        Ok(self.api.send_empty(request).await?)
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), OrdersServiceError> {
        let request = self.api.request(Method::DELETE, &format!("/don-hang/{id}"));

        self.api.send_empty(request).await.map_err(|error| {
            if error.is_not_found() {
                OrdersServiceError::NotFound
            } else {
                OrdersServiceError::Api(error)
            }
        })
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Create an order through the member or guest endpoint.
    ///
    /// Returns the new order's id when the backend reports one.
    async fn create_order(&self, draft: OrderDraft) -> Result<Option<OrderId>, OrdersServiceError>;

    /// List a page of orders.
    async fn list_orders(&self, query: OrderQuery) -> Result<Page<Order>, OrdersServiceError>;

    /// Retrieve a single order with its lines.
    async fn get_order(&self, id: OrderId) -> Result<Order, OrdersServiceError>;

    /// Send a status change.
    async fn update_status(&self, update: StatusUpdate) -> Result<(), OrdersServiceError>;

    /// Delete an order. Separate from any status change.
    async fn delete_order(&self, id: OrderId) -> Result<(), OrdersServiceError>;
}
