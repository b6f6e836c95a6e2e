//! Order Status State Machine
//!
//! Two deliberately different ways to change an order's status:
//!
//! - [`admin_set_status`] is the administrative edit. It writes whatever status
//!   the operator picks, backwards included.
//! - [`quick_advance`] and [`plan_bulk`] only move orders forward and never
//!   touch terminal orders.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::{
    ids::OrderId,
    orders::{
        Order,
        status::{OrderStatus, StatusVocabulary},
    },
};

/// Errors raised by the forward-only transition paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The order is delivered or cancelled.
    #[error("order {id} is already {status} and cannot advance")]
    Terminal {
        /// Order id
        id: OrderId,

        /// Its terminal status
        status: OrderStatus,
    },

    /// Bulk updates only move orders forward.
    #[error("orders cannot be moved back to {0} in bulk")]
    BackwardTarget(OrderStatus),

    /// Nothing was selected for a bulk update.
    #[error("no orders selected")]
    NothingSelected,
}

/// The one-step action offered for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    /// Status the action moves to
    pub target: OrderStatus,

    /// Button label
    pub label: &'static str,
}

/// The quick action for `status`, `None` for terminal orders.
pub fn quick_action(status: OrderStatus) -> Option<QuickAction> {
    let target = status.next()?;

    let label = match status {
        OrderStatus::Pending => "Xác nhận",
        OrderStatus::Confirmed => "Giao hàng",
        _ => "Hoàn tất",
    };

    Some(QuickAction { target, label })
}

/// Which surface produced an update; decides the outbound vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePath {
    /// Administrative edit form.
    AdminEdit,

    /// Staff "next status" button.
    QuickAdvance,

    /// Staff bulk update.
    Bulk,
}

impl UpdatePath {
    /// Vocabulary the backend expects from this surface.
    pub fn vocabulary(self) -> StatusVocabulary {
        match self {
            Self::AdminEdit => StatusVocabulary::DisplayLabel,
            Self::QuickAdvance | Self::Bulk => StatusVocabulary::MachineCode,
        }
    }
}

/// A status change ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Order to update
    pub order_id: OrderId,

    /// New status
    pub status: OrderStatus,

    /// New delivery address, administrative edits only
    pub address: Option<String>,

    /// Surface that produced the update
    pub path: UpdatePath,
}

impl StatusUpdate {
    /// The status in the vocabulary of [`StatusUpdate::path`].
    pub fn wire_status(&self) -> &'static str {
        self.status.wire(self.path.vocabulary())
    }
}

/// Administrative edit: set any status, optionally with a new address.
pub fn admin_set_status(order: &Order, status: OrderStatus, address: Option<String>) -> StatusUpdate {
    StatusUpdate {
        order_id: order.id,
        status,
        address: address.filter(|address| !address.trim().is_empty()),
        path: UpdatePath::AdminEdit,
    }
}

/// Advance `order` exactly one step.
///
/// # Errors
///
/// Returns [`TransitionError::Terminal`] for delivered or cancelled orders.
pub fn quick_advance(order: &Order) -> Result<StatusUpdate, TransitionError> {
    let action = quick_action(order.status).ok_or(TransitionError::Terminal {
        id: order.id,
        status: order.status,
    })?;

    Ok(StatusUpdate {
        order_id: order.id,
        status: action.target,
        address: None,
        path: UpdatePath::QuickAdvance,
    })
}

/// Orders picked for a bulk update. Terminal orders can never be picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSelection {
    ids: BTreeSet<OrderId>,
}

impl BulkSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `order` may be picked at all.
    pub fn is_selectable(order: &Order) -> bool {
        !order.status.is_terminal()
    }

    /// Flip `order`. Returns whether it is picked afterwards; terminal orders
    /// are never picked.
    pub fn toggle(&mut self, order: &Order) -> bool {
        if !Self::is_selectable(order) {
            self.ids.remove(&order.id);
            return false;
        }

        if self.ids.remove(&order.id) {
            false
        } else {
            self.ids.insert(order.id);
            true
        }
    }

    /// Pick every selectable order in `orders`, or clear the selection.
    pub fn select_all(&mut self, orders: &[Order], flag: bool) {
        self.ids.clear();

        if flag {
            self.ids.extend(
                orders
                    .iter()
                    .filter(|order| Self::is_selectable(order))
                    .map(|order| order.id),
            );
        }
    }

    /// Drop ids that are no longer listed or have become terminal.
    pub fn retain_eligible(&mut self, orders: &[Order]) {
        self.ids.retain(|id| {
            orders
                .iter()
                .any(|order| order.id == *id && Self::is_selectable(order))
        });
    }

    /// Whether `id` is picked.
    pub fn contains(&self, id: OrderId) -> bool {
        self.ids.contains(&id)
    }

    /// Picked ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.ids.iter().copied()
    }

    /// Number of picked orders.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is picked.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Which orders a bulk update will touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPlan {
    /// Status every eligible order moves to
    pub target: OrderStatus,

    /// Orders that will be updated
    pub eligible: Vec<OrderId>,

    /// Terminal orders and orders the move would not take forward
    pub skipped: Vec<OrderId>,
}

impl BulkPlan {
    /// One update per eligible order.
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.eligible
            .iter()
            .map(|id| StatusUpdate {
                order_id: *id,
                status: self.target,
                address: None,
                path: UpdatePath::Bulk,
            })
            .collect()
    }
}

/// Split `orders` into those a bulk move to `target` applies to and those it
/// skips: terminal orders, and orders already at or past `target`.
///
/// # Errors
///
/// - [`TransitionError::BackwardTarget`] when `target` is pending.
/// - [`TransitionError::NothingSelected`] when `orders` is empty.
pub fn plan_bulk<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    target: OrderStatus,
) -> Result<BulkPlan, TransitionError> {
    if target == OrderStatus::Pending {
        return Err(TransitionError::BackwardTarget(target));
    }

    let (eligible, skipped): (Vec<&Order>, Vec<&Order>) = orders
        .into_iter()
        .partition(|order| order.status.can_advance_to(target));

    if eligible.is_empty() && skipped.is_empty() {
        return Err(TransitionError::NothingSelected);
    }

    Ok(BulkPlan {
        target,
        eligible: eligible.into_iter().map(|order| order.id).collect(),
        skipped: skipped.into_iter().map(|order| order.id).collect(),
    })
}

/// Outcome of a bulk update. Units succeed or fail independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// Orders the backend updated
    pub succeeded: Vec<OrderId>,

    /// Orders whose update failed, with the reason
    pub failed: Vec<(OrderId, String)>,

    /// Orders that were never sent
    pub skipped: Vec<OrderId>,
}

impl BulkReport {
    /// Whether every sent update succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
