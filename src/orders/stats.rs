//! Order list statistics

use crate::{
    money::{self, Amount, PricingError},
    orders::{Order, page::Page, status::OrderStatus},
};

/// Figures shown above the order list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderStats {
    /// Orders across all pages
    pub total_elements: u64,

    /// Sum of totals of the non-cancelled orders on this page
    pub revenue: Amount,

    /// Pending orders on this page
    pub pending: usize,
}

impl OrderStats {
    /// Compute the figures for `page`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the revenue cannot be summed.
    pub fn from_page(page: &Page<Order>) -> Result<Self, PricingError> {
        let revenue = money::sum(
            page.items
                .iter()
                .filter(|order| order.status != OrderStatus::Cancelled)
                .map(|order| order.total),
        )?;

        Ok(Self {
            total_elements: page.total_elements,
            revenue,
            pending: page
                .items
                .iter()
                .filter(|order| order.status == OrderStatus::Pending)
                .count(),
        })
    }
}
