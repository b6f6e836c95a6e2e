//! Money
//!
//! All storefront amounts are Vietnamese đồng, which has no minor unit, so one
//! minor unit is one đồng.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;

/// An amount of money in the storefront currency.
pub type Amount = Money<'static, Currency>;

/// Errors that can occur while pricing lines and totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Multiplying or summing amounts overflowed.
    #[error("amount overflowed while pricing")]
    Overflow,

    /// A decimal amount could not be represented in whole đồng.
    #[error("amount {0} cannot be represented in whole dong")]
    Unrepresentable(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Build an amount from whole đồng.
pub fn vnd(amount: i64) -> Amount {
    Money::from_minor(amount, iso::VND)
}

/// The zero amount.
pub fn zero() -> Amount {
    vnd(0)
}

/// Price of `quantity` units at `unit_price`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit.
pub fn line_total(unit_price: &Amount, quantity: u32) -> Result<Amount, PricingError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Sum a sequence of amounts, returning zero for an empty sequence.
///
/// # Errors
///
/// Returns a [`PricingError::Money`] on currency mismatch.
pub fn sum(amounts: impl IntoIterator<Item = Amount>) -> Result<Amount, PricingError> {
    amounts
        .into_iter()
        .try_fold(zero(), |acc, amount| Ok(acc.add(amount)?))
}

/// Round a decimal wire amount half away from zero to whole đồng.
///
/// # Errors
///
/// Returns [`PricingError::Unrepresentable`] if the rounded value does not fit in an `i64`.
pub fn from_decimal(value: Decimal) -> Result<Amount, PricingError> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(vnd)
        .ok_or(PricingError::Unrepresentable(value))
}

/// `percent` percent of `amount`, rounded half away from zero.
///
/// A `percent` of `10` means ten percent.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the calculation cannot be represented.
pub fn percent_of(amount: &Amount, percent: Decimal) -> Result<Amount, PricingError> {
    let minor = Decimal::from_i64(amount.to_minor_units()).ok_or(PricingError::Overflow)?;

    let applied = minor
        .checked_mul(percent)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::Overflow)?;

    let rounded = applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(rounded, amount.currency()))
}

/// The smaller of two amounts.
pub fn min(a: Amount, b: Amount) -> Amount {
    if a.to_minor_units() <= b.to_minor_units() {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn line_total_multiplies_by_quantity() -> TestResult {
        assert_eq!(line_total(&vnd(125_000), 4)?, vnd(500_000));

        Ok(())
    }

    #[test]
    fn line_total_overflow_returns_error() {
        let result = line_total(&vnd(i64::MAX), 2);

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn sum_of_nothing_is_zero() -> TestResult {
        assert_eq!(sum([])?, zero());

        Ok(())
    }

    #[test]
    fn from_decimal_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(from_decimal(Decimal::new(499_995, 1))?, vnd(50_000));
        assert_eq!(from_decimal(Decimal::new(499_994, 1))?, vnd(49_999));

        Ok(())
    }

    #[test]
    fn percent_of_rounds_to_whole_dong() -> TestResult {
        assert_eq!(percent_of(&vnd(333_333), Decimal::from(10))?, vnd(33_333));
        assert_eq!(percent_of(&vnd(500_000), Decimal::from(15))?, vnd(75_000));

        Ok(())
    }

    #[test]
    fn min_picks_smaller_amount() {
        assert_eq!(min(vnd(3), vnd(5)), vnd(3));
        assert_eq!(min(vnd(9), vnd(5)), vnd(5));
    }
}
