//! Quantity changes
//!
//! Stepping a line's quantity is a decision, not a mutation: stepping below one
//! asks for the line to be removed (after the buyer confirms) instead of
//! writing a zero quantity.

use crate::cart::CartLine;

/// Outcome of stepping a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Update the line to this quantity.
    NewQuantity(u32),

    /// The line would drop to zero; ask the buyer to confirm its removal.
    RequestRemoval,
}

/// Decide what a "decrease" on `line` does.
pub fn decrease_quantity(line: &CartLine) -> QuantityChange {
    if line.quantity() > 1 {
        QuantityChange::NewQuantity(line.quantity() - 1)
    } else {
        QuantityChange::RequestRemoval
    }
}

/// Decide what an "increase" on `line` does.
pub fn increase_quantity(line: &CartLine) -> QuantityChange {
    QuantityChange::NewQuantity(line.quantity().saturating_add(1))
}
