//! Order Desk
//!
//! The staff side: one page of orders, the bulk selection over it, and the
//! status changes staff can make. Every change is followed by a refetch of the
//! current page; a list response overtaken by a newer load is dropped.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard},
};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use petlor::{
    ids::OrderId,
    money::PricingError,
    orders::{
        Order,
        page::{OrderQuery, Page},
        stats::OrderStats,
        status::OrderStatus,
        transitions::{self, BulkReport, BulkSelection, TransitionError, plan_bulk},
    },
};

use crate::orders::{OrdersService, OrdersServiceError};

/// Reported for an update whose task ended without an answer.
const UPDATE_LOST: &str = "update did not finish";

/// Order desk errors.
#[derive(Debug, Error)]
pub enum OrderDeskError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("order {0} is not on the current page")]
    UnknownOrder(OrderId),

    #[error("order desk state is unavailable")]
    Poisoned,
}

#[derive(Debug)]
struct DeskState {
    query: OrderQuery,
    page: Page<Order>,
    selection: BulkSelection,
    generation: u64,
}

pub struct OrderDesk {
    orders: Arc<dyn OrdersService>,
    state: Mutex<DeskState>,
}

fn empty_page(query: &OrderQuery) -> Page<Order> {
    Page {
        items: Vec::new(),
        number: query.page,
        size: query.size,
        total_pages: 0,
        total_elements: 0,
    }
}

impl OrderDesk {
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersService>) -> Self {
        let query = OrderQuery::default();

        Self {
            orders,
            state: Mutex::new(DeskState {
                page: empty_page(&query),
                query,
                selection: BulkSelection::new(),
                generation: 0,
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, DeskState>, OrderDeskError> {
        self.state.lock().map_err(|_poisoned| OrderDeskError::Poisoned)
    }

    /// Load a page of orders and make `query` the current one.
    ///
    /// Ids that left the page or became terminal drop out of the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or sends bad rows.
    #[tracing::instrument(name = "desk.load", skip(self), err)]
    pub async fn load(&self, query: OrderQuery) -> Result<Page<Order>, OrderDeskError> {
        let generation = {
            let mut state = self.state()?;

            state.generation += 1;
            state.query = query.clone();
            state.generation
        };

        let page = self.orders.list_orders(query).await?;

        let mut state = self.state()?;

        if state.generation == generation {
            state.selection.retain_eligible(&page.items);
            state.page = page.clone();
        } else {
            debug!(generation, "dropped stale order page");
        }

        Ok(page)
    }

    /// Reload the current page.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or sends bad rows.
    pub async fn refetch(&self) -> Result<Page<Order>, OrderDeskError> {
        let query = self.state()?.query.clone();

        self.load(query).await
    }

    /// Orders on the current page.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDeskError::Poisoned`] if a previous holder panicked.
    pub fn orders(&self) -> Result<Vec<Order>, OrderDeskError> {
        Ok(self.state()?.page.items.clone())
    }

    /// Header figures for the current page.
    ///
    /// # Errors
    ///
    /// Returns an error if an order total cannot be summed.
    pub fn stats(&self) -> Result<OrderStats, OrderDeskError> {
        Ok(OrderStats::from_page(&self.state()?.page)?)
    }

    /// One order with its lines, fetched fresh.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::NotFound`] for an unknown id.
    pub async fn order(&self, id: OrderId) -> Result<Order, OrderDeskError> {
        Ok(self.orders.get_order(id).await?)
    }

    async fn find(&self, id: OrderId) -> Result<Order, OrderDeskError> {
        let listed = self
            .state()?
            .page
            .items
            .iter()
            .find(|order| order.id == id)
            .cloned();

        match listed {
            Some(order) => Ok(order),
            None => self.order(id).await,
        }
    }

    /// Move an order one step forward.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::Terminal`] for delivered or cancelled orders.
    /// - [`OrderDeskError::Orders`] when the backend refuses.
    #[tracing::instrument(name = "desk.quick_advance", skip(self), err)]
    pub async fn quick_advance(&self, id: OrderId) -> Result<OrderStatus, OrderDeskError> {
        let order = self.find(id).await?;
        let update = transitions::quick_advance(&order)?;
        let target = update.status;

        self.orders.update_status(update).await?;

        info!(order_id = %id, from = %order.status, to = %target, "order advanced");

        self.refetch().await?;

        Ok(target)
    }

    /// Set any status and optionally a new shipping address.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be found or the backend refuses.
    #[tracing::instrument(name = "desk.admin_edit", skip(self, address), err)]
    pub async fn admin_edit(
        &self,
        id: OrderId,
        status: OrderStatus,
        address: Option<String>,
    ) -> Result<(), OrderDeskError> {
        let order = self.find(id).await?;
        let update = transitions::admin_set_status(&order, status, address);

        self.orders.update_status(update).await?;

        info!(order_id = %id, from = %order.status, to = %status, "order edited");

        self.refetch().await?;

        Ok(())
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::NotFound`] for an unknown id.
    #[tracing::instrument(name = "desk.delete", skip(self), err)]
    pub async fn delete(&self, id: OrderId) -> Result<(), OrderDeskError> {
        self.orders.delete_order(id).await?;

        info!(order_id = %id, "order deleted");

        self.refetch().await?;

        Ok(())
    }

    /// Flip an order on the current page in or out of the bulk selection.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDeskError::UnknownOrder`] if it is not on the page.
    pub fn toggle(&self, id: OrderId) -> Result<bool, OrderDeskError> {
        let mut state = self.state()?;
        let DeskState {
            page, selection, ..
        } = &mut *state;

        let order = page
            .items
            .iter()
            .find(|order| order.id == id)
            .ok_or(OrderDeskError::UnknownOrder(id))?;

        Ok(selection.toggle(order))
    }

    /// Pick every selectable order on the page, or none.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDeskError::Poisoned`] if a previous holder panicked.
    pub fn select_all(&self, flag: bool) -> Result<(), OrderDeskError> {
        let mut state = self.state()?;
        let DeskState {
            page, selection, ..
        } = &mut *state;

        selection.select_all(&page.items, flag);

        Ok(())
    }

    /// Picked order ids.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDeskError::Poisoned`] if a previous holder panicked.
    pub fn selected(&self) -> Result<Vec<OrderId>, OrderDeskError> {
        Ok(self.state()?.selection.ids().collect())
    }

    /// Move the picked orders to `target` and clear the selection.
    ///
    /// # Errors
    ///
    /// See [`OrderDesk::bulk_transition`].
    pub async fn bulk_transition_selected(
        &self,
        target: OrderStatus,
    ) -> Result<BulkReport, OrderDeskError> {
        let picked: Vec<Order> = {
            let state = self.state()?;

            state
                .page
                .items
                .iter()
                .filter(|order| state.selection.contains(order.id))
                .cloned()
                .collect()
        };

        let report = self.bulk_transition(&picked, target).await?;

        self.state()?.selection = BulkSelection::new();

        Ok(report)
    }

    /// Move `orders` forward to `target`, one request per order, all in flight
    /// together. Terminal orders are skipped. A failure does not stop the
    /// others; the page is refetched once everything has settled.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::BackwardTarget`] for a pending target, before any
    ///   request.
    /// - [`TransitionError::NothingSelected`] when `orders` is empty.
    /// - [`OrderDeskError::Orders`] if the closing refetch fails.
    #[tracing::instrument(name = "desk.bulk_transition", skip(self, orders), fields(count = orders.len()), err)]
    pub async fn bulk_transition(
        &self,
        orders: &[Order],
        target: OrderStatus,
    ) -> Result<BulkReport, OrderDeskError> {
        let plan = plan_bulk(orders, target)?;

        let mut outstanding: BTreeSet<OrderId> = plan.eligible.iter().copied().collect();
        let mut tasks = JoinSet::new();

        for update in plan.updates() {
            let service = Arc::clone(&self.orders);

            tasks.spawn(async move {
                let id = update.order_id;

                (id, service.update_status(update).await)
            });
        }

        let mut report = BulkReport {
            skipped: plan.skipped,
            ..BulkReport::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(()))) => {
                    outstanding.remove(&id);
                    report.succeeded.push(id);
                }
                Ok((id, Err(error))) => {
                    warn!(order_id = %id, %error, "bulk update failed");

                    outstanding.remove(&id);
                    report.failed.push((id, error.to_string()));
                }
                Err(error) => warn!(%error, "bulk update task ended abnormally"),
            }
        }

        report
            .failed
            .extend(outstanding.into_iter().map(|id| (id, UPDATE_LOST.to_string())));

        report.succeeded.sort_unstable();
        report.failed.sort_unstable();

        info!(
            %target,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "bulk update finished"
        );

        self.refetch().await?;

        Ok(report)
    }
}
