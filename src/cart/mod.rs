//! Cart
//!
//! The authenticated session's cart as last fetched from the backend. Lines can
//! only be mutated through the [`selection::CartStore`] so that the checkout
//! selection never references a line that no longer exists.

use jiff::civil::DateTime;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    ids::{CartLineId, ProductId},
    money::{self, Amount, PricingError},
};

pub mod quantity;
pub mod selection;

/// Errors related to cart construction and mutation.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Two lines share the same id.
    #[error("cart line {0} appears more than once")]
    DuplicateLine(CartLineId),

    /// Lines always hold at least one unit.
    #[error("cart line {0} must have a quantity of at least 1")]
    ZeroQuantity(CartLineId),

    /// The line is not present in the cart.
    #[error("cart line {0} not found")]
    UnknownLine(CartLineId),

    /// Errors bubbled up from pricing the cart.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A single product line in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: CartLineId,
    product_id: ProductId,
    name: String,
    unit_price: Amount,
    quantity: u32,
    added_at: DateTime,
}

impl CartLine {
    /// Create a new cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] when `quantity` is zero.
    pub fn new(
        id: CartLineId,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Amount,
        quantity: u32,
        added_at: DateTime,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity(id));
        }

        Ok(Self {
            id,
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            added_at,
        })
    }

    /// Cart line id.
    pub fn id(&self) -> CartLineId {
        self.id
    }

    /// Product this line refers to.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Product display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of one unit.
    pub fn unit_price(&self) -> &Amount {
        &self.unit_price
    }

    /// Number of units, always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// When the product was added to the cart.
    pub fn added_at(&self) -> DateTime {
        self.added_at
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the line total does not fit.
    pub fn line_total(&self) -> Result<Amount, PricingError> {
        money::line_total(&self.unit_price, self.quantity)
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateLine`] if two lines share an id.
    pub fn with_lines(lines: impl Into<Vec<CartLine>>) -> Result<Self, CartError> {
        let lines = lines.into();
        let mut seen = FxHashSet::default();

        for line in &lines {
            if !seen.insert(line.id) {
                return Err(CartError::DuplicateLine(line.id));
            }
        }

        Ok(Self { lines })
    }

    /// Lines in the order the backend returned them.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Lines sorted for display, most recently added first.
    pub fn newest_first(&self) -> Vec<&CartLine> {
        let mut lines: Vec<&CartLine> = self.lines.iter().collect();

        lines.sort_by(|a, b| b.added_at.cmp(&a.added_at));

        lines
    }

    /// Look up a line by id.
    pub fn line(&self, id: CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Whether a line with this id is present.
    pub fn contains(&self, id: CartLineId) -> bool {
        self.line(id).is_some()
    }

    /// Ids of every line.
    pub fn line_ids(&self) -> impl Iterator<Item = CartLineId> + '_ {
        self.lines.iter().map(CartLine::id)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subtotal of the whole cart, regardless of selection.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn subtotal(&self) -> Result<Amount, PricingError> {
        money::sum(
            self.lines
                .iter()
                .map(CartLine::line_total)
                .collect::<Result<Vec<_>, _>>()?,
        )
    }

    pub(crate) fn remove(&mut self, id: CartLineId) -> Option<CartLine> {
        let position = self.lines.iter().position(|line| line.id == id)?;

        Some(self.lines.remove(position))
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }

    pub(crate) fn set_quantity(&mut self, id: CartLineId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity(id));
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(CartError::UnknownLine(id))?;

        line.quantity = quantity;

        Ok(())
    }
}
