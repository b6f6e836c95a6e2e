//! Checkout session
//!
//! The only owner of the cart store and the voucher engine. Every operation
//! that can move the selection subtotal feeds the new value to the engine
//! before returning, so no read ever pairs an old discount with a new subtotal.

use crate::{
    cart::{
        Cart, CartLine,
        selection::{CartStore, RefreshTicket, RemovalPlan, SelectionStats},
    },
    checkout::{
        CheckoutError,
        total::{self, shipping_fee},
    },
    ids::CartLineId,
    money::{self, Amount, PricingError},
    vouchers::{
        VoucherError,
        engine::{AppliedDiscount, ValidationOutcome, ValidationTicket, VoucherEngine},
    },
};

/// The figures shown in the order summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutSummary {
    /// Number of selected lines
    pub selected_count: usize,

    /// Subtotal of the selected lines
    pub subtotal: Amount,

    /// Applied discount, zero when none
    pub discount: Amount,

    /// Flat shipping fee
    pub shipping: Amount,

    /// Amount payable
    pub total: Amount,
}

/// Cart selection plus voucher state for one buyer.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    store: CartStore,
    vouchers: VoucherEngine,
}

impl CheckoutSession {
    /// Start a session around a fetched cart.
    pub fn new(cart: Cart) -> Self {
        let mut session = Self {
            store: CartStore::new(cart),
            vouchers: VoucherEngine::new(),
        };

        session.vouchers.observe_subtotal(money::zero());

        session
    }

    /// Read access to the cart store.
    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Read access to the voucher engine.
    pub fn vouchers(&self) -> &VoucherEngine {
        &self.vouchers
    }

    /// Flip selection of a line.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the new subtotal cannot be computed.
    pub fn toggle(&mut self, id: CartLineId) -> Result<bool, PricingError> {
        let selected = self.store.toggle(id);

        self.sync()?;

        Ok(selected)
    }

    /// Select all lines or none.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the new subtotal cannot be computed.
    pub fn select_all(&mut self, flag: bool) -> Result<(), PricingError> {
        self.store.select_all(flag);

        self.sync().map(drop)
    }

    /// Change a line's quantity in the local snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the line is unknown, the quantity is zero
    /// or the new subtotal cannot be computed.
    pub fn set_quantity(&mut self, id: CartLineId, quantity: u32) -> Result<(), CheckoutError> {
        self.store.set_quantity(id, quantity)?;

        self.sync()?;

        Ok(())
    }

    /// Remove a line from the local snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the new subtotal cannot be computed.
    pub fn remove_line(&mut self, id: CartLineId) -> Result<Option<CartLine>, PricingError> {
        let removed = self.store.remove_line(id);

        self.sync()?;

        Ok(removed)
    }

    /// Empty the local snapshot.
    pub fn clear_cart(&mut self) {
        self.store.clear();
        self.vouchers.clear();
        self.vouchers.observe_subtotal(money::zero());
    }

    /// Replace the snapshot with a fetched cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the new subtotal cannot be computed.
    pub fn replace_cart(&mut self, cart: Cart) -> Result<(), PricingError> {
        self.store.replace(cart);

        self.sync().map(drop)
    }

    /// Start a cart refetch.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.store.begin_refresh()
    }

    /// Apply a refetched cart if `ticket` is still current.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the new subtotal cannot be computed.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, cart: Cart) -> Result<bool, PricingError> {
        if !self.store.complete_refresh(ticket, cart) {
            return Ok(false);
        }

        self.sync()?;

        Ok(true)
    }

    /// How "delete selected" should be carried out.
    pub fn removal_plan(&self) -> RemovalPlan {
        self.store.removal_plan()
    }

    /// Selection count and subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn stats(&self) -> Result<SelectionStats, PricingError> {
        self.store.stats()
    }

    /// The order summary for the current selection.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn summary(&self) -> Result<CheckoutSummary, PricingError> {
        let stats = self.store.stats()?;
        let discount = self
            .vouchers
            .applied()
            .filter(|applied| applied.subtotal() == stats.selected_subtotal)
            .map_or_else(money::zero, AppliedDiscount::amount);
        let shipping = shipping_fee();

        Ok(CheckoutSummary {
            selected_count: stats.selected_count,
            subtotal: stats.selected_subtotal,
            discount,
            shipping,
            total: total::total(&stats.selected_subtotal, &discount, &shipping),
        })
    }

    /// Start validating `raw_code` against the current selection subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::NoSelection`] or [`VoucherError::EmptyCode`]
    /// before any request is made.
    pub fn begin_voucher(&mut self, raw_code: &str) -> Result<ValidationTicket, CheckoutError> {
        let subtotal = self.store.stats()?.selected_subtotal;

        Ok(self.vouchers.begin(raw_code, subtotal)?)
    }

    /// Apply the validator's answer.
    ///
    /// # Errors
    ///
    /// See [`VoucherEngine::complete`].
    pub fn complete_voucher(
        &mut self,
        ticket: ValidationTicket,
        outcome: ValidationOutcome,
    ) -> Result<AppliedDiscount, VoucherError> {
        self.vouchers.complete(ticket, outcome)
    }

    /// Drop the applied voucher.
    pub fn clear_voucher(&mut self) {
        self.vouchers.clear();
    }

    /// Show the voucher picker.
    pub fn open_voucher_picker(&mut self) {
        self.vouchers.open_picker();
    }

    /// Hide the voucher picker.
    pub fn close_voucher_picker(&mut self) {
        self.vouchers.close_picker();
    }

    /// Carry the selection and voucher to the checkout page.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptySelection`] if nothing is selected.
    pub fn hand_off(&self) -> Result<CheckoutHandOff, CheckoutError> {
        let lines: Vec<CartLine> = self
            .store
            .selected_lines()
            .into_iter()
            .cloned()
            .collect();

        if lines.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        Ok(CheckoutHandOff {
            lines,
            voucher: self.vouchers.applied().cloned(),
        })
    }

    /// Clear local cart state once an order is final.
    pub fn finish_order(&mut self) {
        self.clear_cart();
    }

    fn sync(&mut self) -> Result<bool, PricingError> {
        match self.store.stats() {
            Ok(stats) => Ok(self.vouchers.observe_subtotal(stats.selected_subtotal)),
            Err(error) => {
                self.vouchers.clear();

                Err(error)
            }
        }
    }
}

/// What the cart page passes to the checkout page.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutHandOff {
    lines: Vec<CartLine>,
    voucher: Option<AppliedDiscount>,
}

impl CheckoutHandOff {
    /// Build a hand-off directly, e.g. from navigation state.
    pub fn new(lines: Vec<CartLine>, voucher: Option<AppliedDiscount>) -> Self {
        Self { lines, voucher }
    }

    /// Lines carried forward.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Subtotal re-derived from the carried lines.
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

    /// The carried voucher, only if it was validated against the re-derived
    /// subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn honoured_voucher(&self) -> Result<Option<&AppliedDiscount>, PricingError> {
        let subtotal = self.subtotal()?;

        Ok(self
            .voucher
            .as_ref()
            .filter(|applied| applied.subtotal() == subtotal))
    }

    /// Summary re-derived from the carried lines.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn summary(&self) -> Result<CheckoutSummary, PricingError> {
        let subtotal = self.subtotal()?;
        let discount = self
            .honoured_voucher()?
            .map_or_else(money::zero, AppliedDiscount::amount);
        let shipping = shipping_fee();

        Ok(CheckoutSummary {
            selected_count: self.lines.len(),
            subtotal,
            discount,
            shipping,
            total: total::total(&subtotal, &discount, &shipping),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{cart::tests::line, money::vnd};

    use super::*;

    fn session() -> Result<CheckoutSession, CheckoutError> {
        Ok(CheckoutSession::new(Cart::with_lines([
            line(1, 100_000, 2, 1),
            line(2, 150_000, 2, 2),
            line(3, 50_000, 2, 3),
        ])?))
    }

    fn apply(session: &mut CheckoutSession, amount: i64) -> Result<AppliedDiscount, CheckoutError> {
        let ticket = session.begin_voucher("SALE50K")?;

        Ok(session.complete_voucher(ticket, ValidationOutcome::Discount(vnd(amount)))?)
    }

    #[test]
    fn summary_with_voucher() -> TestResult {
        let mut session = session()?;

        session.toggle(CartLineId::new(1))?;
        session.toggle(CartLineId::new(2))?;
        apply(&mut session, 50_000)?;

        let summary = session.summary()?;

        assert_eq!(summary.subtotal, vnd(500_000));
        assert_eq!(summary.discount, vnd(50_000));
        assert_eq!(summary.total, vnd(480_000));

        Ok(())
    }

    #[test]
    fn deselecting_clears_the_voucher() -> TestResult {
        let mut session = session()?;

        session.toggle(CartLineId::new(1))?;
        session.toggle(CartLineId::new(2))?;
        apply(&mut session, 50_000)?;

        session.toggle(CartLineId::new(1))?;

        let summary = session.summary()?;

        assert!(session.vouchers().applied().is_none());
        assert_eq!(summary.subtotal, vnd(300_000));
        assert_eq!(summary.discount, vnd(0));
        assert_eq!(summary.total, vnd(330_000));

        Ok(())
    }

    #[test]
    fn quantity_change_clears_the_voucher() -> TestResult {
        let mut session = session()?;

        session.select_all(true)?;
        apply(&mut session, 10_000)?;
        session.set_quantity(CartLineId::new(3), 1)?;

        assert!(session.vouchers().applied().is_none());

        Ok(())
    }

    #[test]
    fn refresh_with_identical_cart_keeps_the_voucher() -> TestResult {
        let mut session = session()?;

        session.select_all(true)?;
        apply(&mut session, 10_000)?;

        let ticket = session.begin_refresh();
        let cart = session.store().cart().clone();

        assert!(session.complete_refresh(ticket, cart)?);
        assert_eq!(session.summary()?.discount, vnd(10_000));

        Ok(())
    }

    #[test]
    fn voucher_requires_a_selection() -> TestResult {
        let mut session = session()?;

        assert_eq!(
            session.begin_voucher("SALE50K"),
            Err(CheckoutError::Voucher(VoucherError::NoSelection))
        );

        Ok(())
    }

    #[test]
    fn hand_off_requires_a_selection() -> TestResult {
        let session = session()?;

        assert_eq!(session.hand_off(), Err(CheckoutError::EmptySelection));

        Ok(())
    }

    #[test]
    fn hand_off_drops_discount_validated_for_other_lines() -> TestResult {
        let mut session = session()?;

        session.select_all(true)?;
        let applied = apply(&mut session, 50_000)?;

        let hand_off = CheckoutHandOff::new(vec![line(1, 100_000, 2, 1)], Some(applied));
        let summary = hand_off.summary()?;

        assert!(hand_off.honoured_voucher()?.is_none());
        assert_eq!(summary.discount, vnd(0));
        assert_eq!(summary.total, vnd(230_000));

        Ok(())
    }

    #[test]
    fn hand_off_keeps_matching_discount() -> TestResult {
        let mut session = session()?;

        session.select_all(true)?;
        apply(&mut session, 50_000)?;

        let hand_off = session.hand_off()?;

        assert_eq!(hand_off.lines().len(), 3);
        assert_eq!(hand_off.summary()?.total, vnd(600_000 - 50_000 + 30_000));

        Ok(())
    }

    #[test]
    fn finishing_clears_everything() -> TestResult {
        let mut session = session()?;

        session.select_all(true)?;
        apply(&mut session, 50_000)?;
        session.finish_order();

        assert!(session.store().cart().is_empty());
        assert!(session.vouchers().applied().is_none());
        assert_eq!(session.summary()?.total, vnd(30_000));

        Ok(())
    }
}
