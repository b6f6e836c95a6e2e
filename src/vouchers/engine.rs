//! Voucher Application Engine
//!
//! Validation is split in two so the remote call can happen outside any lock:
//! [`VoucherEngine::begin`] checks the inputs and issues a [`ValidationTicket`],
//! the caller asks the validator, then [`VoucherEngine::complete`] applies the
//! outcome only if the ticket is still the latest one and the subtotal has not
//! moved in the meantime.
//!
//! An applied discount is bound to the subtotal it was validated against.
//! [`VoucherEngine::observe_subtotal`] discards it as soon as that value changes.

use crate::{
    money::{self, Amount},
    vouchers::{VoucherCode, VoucherError},
};

/// A discount accepted by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    code: VoucherCode,
    amount: Amount,
    subtotal: Amount,
}

impl AppliedDiscount {
    /// Code the discount was granted for.
    pub fn code(&self) -> &VoucherCode {
        &self.code
    }

    /// Discount amount.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Subtotal the validator priced the discount against.
    pub fn subtotal(&self) -> Amount {
        self.subtotal
    }
}

/// An in-flight validation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationTicket {
    seq: u64,
    code: VoucherCode,
    subtotal: Amount,
}

impl ValidationTicket {
    /// Code to send to the validator.
    pub fn code(&self) -> &VoucherCode {
        &self.code
    }

    /// Order value to send to the validator.
    pub fn subtotal(&self) -> Amount {
        self.subtotal
    }
}

/// What the validator answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The validator returned this discount amount (possibly zero).
    Discount(Amount),

    /// The request failed; carries the reason to show the buyer.
    Rejected(String),
}

/// Holds the applied discount for the current selection.
#[derive(Debug, Clone, Default)]
pub struct VoucherEngine {
    applied: Option<AppliedDiscount>,
    observed_subtotal: Option<Amount>,
    latest_ticket: u64,
    picker_open: bool,
}

impl VoucherEngine {
    /// Create an engine with nothing applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current selection subtotal.
    ///
    /// Any change discards the applied discount. Returns `true` when a discount
    /// was discarded.
    pub fn observe_subtotal(&mut self, subtotal: Amount) -> bool {
        let changed = self.observed_subtotal.is_some_and(|seen| seen != subtotal);

        self.observed_subtotal = Some(subtotal);

        if changed {
            return self.applied.take().is_some();
        }

        false
    }

    /// Validate inputs and start a validation request.
    ///
    /// # Errors
    ///
    /// - [`VoucherError::NoSelection`] if `subtotal` is not positive.
    /// - [`VoucherError::EmptyCode`] if the code is blank.
    pub fn begin(&mut self, raw_code: &str, subtotal: Amount) -> Result<ValidationTicket, VoucherError> {
        self.observe_subtotal(subtotal);

        if subtotal.to_minor_units() <= 0 {
            return Err(VoucherError::NoSelection);
        }

        let code = VoucherCode::parse(raw_code)?;

        self.latest_ticket += 1;

        Ok(ValidationTicket {
            seq: self.latest_ticket,
            code,
            subtotal,
        })
    }

    /// Apply the validator's answer for `ticket`.
    ///
    /// # Errors
    ///
    /// - [`VoucherError::Superseded`] if a newer request was issued or the
    ///   subtotal changed since `ticket` was issued. Nothing is changed.
    /// - [`VoucherError::ZeroDiscount`] if the discount is zero. Any prior
    ///   discount is cleared.
    /// - [`VoucherError::Rejected`] if the validator refused. Any prior discount
    ///   is cleared.
    pub fn complete(
        &mut self,
        ticket: ValidationTicket,
        outcome: ValidationOutcome,
    ) -> Result<AppliedDiscount, VoucherError> {
        if ticket.seq != self.latest_ticket || self.observed_subtotal != Some(ticket.subtotal) {
            return Err(VoucherError::Superseded(ticket.code));
        }

        match outcome {
            ValidationOutcome::Discount(amount) if amount.to_minor_units() > 0 => {
                let applied = AppliedDiscount {
                    code: ticket.code,
                    amount: money::min(amount, ticket.subtotal),
                    subtotal: ticket.subtotal,
                };

                self.applied = Some(applied.clone());
                self.picker_open = false;

                Ok(applied)
            }
            ValidationOutcome::Discount(_) => {
                self.applied = None;

                Err(VoucherError::ZeroDiscount(ticket.code))
            }
            ValidationOutcome::Rejected(reason) => {
                self.applied = None;

                Err(VoucherError::Rejected {
                    code: ticket.code,
                    reason,
                })
            }
        }
    }

    /// The applied discount, if any.
    pub fn applied(&self) -> Option<&AppliedDiscount> {
        self.applied.as_ref()
    }

    /// The discount amount to show, zero when nothing is applied.
    pub fn discount(&self) -> Amount {
        self.applied
            .as_ref()
            .map_or_else(money::zero, AppliedDiscount::amount)
    }

    /// Remove the applied discount.
    pub fn clear(&mut self) {
        self.applied = None;
    }

    /// Whether the voucher picker is showing.
    pub fn is_picker_open(&self) -> bool {
        self.picker_open
    }

    /// Show the voucher picker.
    pub fn open_picker(&mut self) {
        self.picker_open = true;
    }

    /// Hide the voucher picker.
    pub fn close_picker(&mut self) {
        self.picker_open = false;
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::money::vnd;

    use super::*;

    fn applied_engine() -> Result<VoucherEngine, VoucherError> {
        let mut engine = VoucherEngine::new();
        let ticket = engine.begin("sale50k", vnd(500_000))?;

        engine.complete(ticket, ValidationOutcome::Discount(vnd(50_000)))?;

        Ok(engine)
    }

    #[test]
    fn positive_discount_is_applied_and_closes_picker() -> TestResult {
        let mut engine = VoucherEngine::new();
        engine.open_picker();

        let ticket = engine.begin(" sale50k ", vnd(500_000))?;
        assert_eq!(ticket.code().as_str(), "SALE50K");

        let applied = engine.complete(ticket, ValidationOutcome::Discount(vnd(50_000)))?;

        assert_eq!(applied.amount(), vnd(50_000));
        assert_eq!(engine.discount(), vnd(50_000));
        assert!(!engine.is_picker_open());

        Ok(())
    }

    #[test]
    fn subtotal_change_discards_discount() -> TestResult {
        let mut engine = applied_engine()?;

        assert!(engine.observe_subtotal(vnd(300_000)));
        assert!(engine.applied().is_none());
        assert_eq!(engine.discount(), vnd(0));

        Ok(())
    }

    #[test]
    fn same_subtotal_keeps_discount() -> TestResult {
        let mut engine = applied_engine()?;

        assert!(!engine.observe_subtotal(vnd(500_000)));
        assert_eq!(engine.discount(), vnd(50_000));

        Ok(())
    }

    #[test]
    fn empty_selection_fails_fast() {
        let mut engine = VoucherEngine::new();

        assert_eq!(engine.begin("SALE", vnd(0)), Err(VoucherError::NoSelection));
    }

    #[test]
    fn blank_code_fails_fast() {
        let mut engine = VoucherEngine::new();

        assert_eq!(engine.begin("  ", vnd(10)), Err(VoucherError::EmptyCode));
    }

    #[test]
    fn zero_discount_clears_prior_discount() -> TestResult {
        let mut engine = applied_engine()?;
        let ticket = engine.begin("NOTHING", vnd(500_000))?;

        let result = engine.complete(ticket, ValidationOutcome::Discount(vnd(0)));

        assert!(matches!(result, Err(VoucherError::ZeroDiscount(_))));
        assert!(engine.applied().is_none());

        Ok(())
    }

    #[test]
    fn rejection_clears_prior_discount_and_keeps_reason() -> TestResult {
        let mut engine = applied_engine()?;
        let ticket = engine.begin("EXPIRED", vnd(500_000))?;

        let result = engine.complete(ticket, ValidationOutcome::Rejected("Mã đã hết hạn".into()));

        assert!(matches!(
            result,
            Err(VoucherError::Rejected { ref reason, .. }) if reason == "Mã đã hết hạn"
        ));
        assert!(engine.applied().is_none());

        Ok(())
    }

    #[test]
    fn older_ticket_is_superseded() -> TestResult {
        let mut engine = VoucherEngine::new();
        let first = engine.begin("FIRST", vnd(500_000))?;
        let second = engine.begin("SECOND", vnd(500_000))?;

        let stale = engine.complete(first, ValidationOutcome::Discount(vnd(10_000)));
        assert!(matches!(stale, Err(VoucherError::Superseded(_))));
        assert!(engine.applied().is_none());

        engine.complete(second, ValidationOutcome::Discount(vnd(20_000)))?;
        assert_eq!(engine.discount(), vnd(20_000));

        Ok(())
    }

    #[test]
    fn response_for_a_previous_subtotal_is_dropped() -> TestResult {
        let mut engine = VoucherEngine::new();
        let ticket = engine.begin("SALE50K", vnd(500_000))?;

        engine.observe_subtotal(vnd(300_000));

        let result = engine.complete(ticket, ValidationOutcome::Discount(vnd(50_000)));

        assert!(matches!(result, Err(VoucherError::Superseded(_))));
        assert_eq!(engine.discount(), vnd(0));

        Ok(())
    }
}
