//! Cart Selection Tracker
//!
//! [`CartStore`] owns the cart snapshot together with the set of lines marked
//! for checkout. Every operation that removes lines prunes the selection before
//! returning, so [`CartStore::stats`] never sees a dangling id.

use rustc_hash::FxHashSet;

use crate::{
    cart::{Cart, CartError, CartLine},
    ids::{CartLineId, ProductId},
    money::{self, Amount, PricingError},
};

/// Ids of the cart lines marked for checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: FxHashSet<CartLineId>,
}

impl SelectionSet {
    /// Whether `id` is selected.
    pub fn contains(&self, id: CartLineId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected lines.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = CartLineId> + '_ {
        self.ids.iter().copied()
    }

    fn retain_present(&mut self, cart: &Cart) {
        self.ids.retain(|id| cart.contains(*id));
    }
}

/// Count and subtotal of the current selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStats {
    /// Number of selected lines.
    pub selected_count: usize,

    /// Sum of unit price times quantity over the selected lines only.
    pub selected_subtotal: Amount,
}

/// Ticket for an in-flight cart refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// What "delete selected" should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalPlan {
    /// Nothing is selected.
    Nothing,

    /// Every line is selected; clear the cart in one request.
    ClearCart,

    /// Remove these lines one by one (line id, product id).
    RemoveLines(Vec<(CartLineId, ProductId)>),
}

/// The cart snapshot and its checkout selection.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    cart: Cart,
    selection: SelectionSet,
    latest_refresh: u64,
}

impl CartStore {
    /// Create a store around a fetched cart with nothing selected.
    pub fn new(cart: Cart) -> Self {
        Self {
            cart,
            ..Self::default()
        }
    }

    /// The cart snapshot.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Flip membership of `id`. Returns whether the line is selected afterwards.
    ///
    /// Lines that are no longer in the cart are ignored.
    pub fn toggle(&mut self, id: CartLineId) -> bool {
        if !self.cart.contains(id) {
            return false;
        }

        if self.selection.ids.remove(&id) {
            false
        } else {
            self.selection.ids.insert(id);
            true
        }
    }

    /// Select every line (`true`) or none (`false`).
    pub fn select_all(&mut self, flag: bool) {
        self.selection.ids.clear();

        if flag {
            self.selection.ids.extend(self.cart.line_ids());
        }
    }

    /// Whether the cart is non-empty and every line is selected.
    pub fn is_all_selected(&self) -> bool {
        !self.cart.is_empty() && self.selection.len() == self.cart.len()
    }

    /// Selection count and subtotal, computed from the live cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn stats(&self) -> Result<SelectionStats, PricingError> {
        let totals = self
            .selected_lines()
            .into_iter()
            .map(CartLine::line_total)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SelectionStats {
            selected_count: totals.len(),
            selected_subtotal: money::sum(totals)?,
        })
    }

    /// Selected lines in cart order.
    pub fn selected_lines(&self) -> Vec<&CartLine> {
        self.cart
            .lines()
            .iter()
            .filter(|line| self.selection.contains(line.id()))
            .collect()
    }

    /// Selected lines as the checkout shows them, most recently added first.
    pub fn selected_newest_first(&self) -> Vec<&CartLine> {
        self.cart
            .newest_first()
            .into_iter()
            .filter(|line| self.selection.contains(line.id()))
            .collect()
    }

    /// Remove a line and drop it from the selection.
    pub fn remove_line(&mut self, id: CartLineId) -> Option<CartLine> {
        let removed = self.cart.remove(id);

        self.selection.ids.remove(&id);

        removed
    }

    /// Empty the cart and the selection.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.selection.ids.clear();
    }

    /// Change a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the line is unknown or `quantity` is zero.
    pub fn set_quantity(&mut self, id: CartLineId, quantity: u32) -> Result<(), CartError> {
        self.cart.set_quantity(id, quantity)
    }

    /// Replace the snapshot with a freshly fetched cart, keeping the selection
    /// for lines that still exist.
    pub fn replace(&mut self, cart: Cart) {
        self.cart = cart;
        self.selection.retain_present(&self.cart);
    }

    /// Start a refetch. Only the most recently issued ticket may complete.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.latest_refresh += 1;

        RefreshTicket(self.latest_refresh)
    }

    /// Apply a refetched cart if `ticket` is still the latest.
    ///
    /// Returns `false` and leaves the store untouched for stale responses.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, cart: Cart) -> bool {
        if ticket.0 != self.latest_refresh {
            return false;
        }

        self.replace(cart);

        true
    }

    /// Decide how to delete the selected lines.
    pub fn removal_plan(&self) -> RemovalPlan {
        if self.selection.is_empty() {
            RemovalPlan::Nothing
        } else if self.is_all_selected() {
            RemovalPlan::ClearCart
        } else {
            RemovalPlan::RemoveLines(
                self.selected_lines()
                    .into_iter()
                    .map(|line| (line.id(), line.product_id()))
                    .collect(),
            )
        }
    }
}
