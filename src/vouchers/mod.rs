//! Vouchers
//!
//! The voucher catalogue as shown to the buyer, plus a local, display-only
//! eligibility estimate. The discount actually applied to a checkout always
//! comes from the remote validator through [`engine::VoucherEngine`].

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::money::{self, Amount, PricingError};

pub mod engine;

/// Errors related to voucher codes and the local eligibility estimate.
#[derive(Debug, Error, PartialEq)]
pub enum VoucherError {
    /// The code is empty after trimming.
    #[error("voucher code must not be empty")]
    EmptyCode,

    /// The voucher is switched off by an operator.
    #[error("voucher {0} is locked")]
    Locked(VoucherCode),

    /// The activity window has not opened yet.
    #[error("voucher {0} is not active yet")]
    NotStarted(VoucherCode),

    /// The activity window has closed.
    #[error("voucher {0} has expired")]
    Expired(VoucherCode),

    /// No uses remain.
    #[error("voucher {0} has been used up")]
    Exhausted(VoucherCode),

    /// The order value is below the voucher's minimum.
    #[error("voucher {code} requires an order of at least {minimum}")]
    BelowMinimum {
        /// Voucher code
        code: VoucherCode,

        /// Minimum order value
        minimum: Amount,
    },

    /// Nothing is selected, so there is no order value to validate against.
    #[error("select at least one product before applying a voucher")]
    NoSelection,

    /// The validator accepted the code but it gives no discount on this order.
    #[error("voucher {0} gives no discount on this order")]
    ZeroDiscount(VoucherCode),

    /// The validator refused the code.
    #[error("voucher {code} was rejected: {reason}")]
    Rejected {
        /// Voucher code
        code: VoucherCode,

        /// Server-provided reason, or a generic fallback
        reason: String,
    },

    /// A newer validation was started, or the subtotal changed, while this one
    /// was in flight.
    #[error("voucher {0} validation was superseded")]
    Superseded(VoucherCode),

    /// Errors bubbled up from discount arithmetic.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A voucher code, trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Normalise a raw code as typed by the buyer.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::EmptyCode`] if nothing remains after trimming.
    pub fn parse(raw: &str) -> Result<Self, VoucherError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(VoucherError::EmptyCode);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// The normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VoucherCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl FromStr for VoucherCode {
    type Err = VoucherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VoucherCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VoucherCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// How a voucher's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    /// `value` is an amount in đồng.
    #[serde(rename = "SO_TIEN")]
    FixedAmount,

    /// `value` is a percentage of the subtotal.
    #[serde(rename = "PHAN_TRAM")]
    Percentage,
}

/// A voucher from the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    /// Unique code
    pub code: VoucherCode,

    /// Discount kind
    pub kind: DiscountKind,

    /// Amount in đồng or percentage, depending on `kind`
    pub value: Decimal,

    /// Minimum order value for the voucher to apply
    pub minimum_order: Amount,

    /// Remaining uses, if limited
    pub usage_limit: Option<i64>,

    /// Start of the activity window
    pub starts_at: Option<DateTime>,

    /// End of the activity window
    pub ends_at: Option<DateTime>,

    /// Operator switch
    pub active: bool,
}

impl Voucher {
    /// Whether the picker lists this voucher: active and not past its end.
    pub fn is_displayable(&self, now: DateTime) -> bool {
        self.active && self.ends_at.is_some_and(|end| now < end)
    }

    /// Estimate the discount this voucher would give on `subtotal`.
    ///
    /// Rules are checked in the same order the backend checks them. The result
    /// never exceeds `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns the first rule the voucher fails as a [`VoucherError`].
    pub fn estimate_discount(&self, subtotal: &Amount, now: DateTime) -> Result<Amount, VoucherError> {
        if !self.active {
            return Err(VoucherError::Locked(self.code.clone()));
        }

        if self.starts_at.is_some_and(|start| now < start) {
            return Err(VoucherError::NotStarted(self.code.clone()));
        }

        if self.ends_at.is_some_and(|end| now > end) {
            return Err(VoucherError::Expired(self.code.clone()));
        }

        if self.usage_limit.is_some_and(|limit| limit <= 0) {
            return Err(VoucherError::Exhausted(self.code.clone()));
        }

        if subtotal.to_minor_units() < self.minimum_order.to_minor_units() {
            return Err(VoucherError::BelowMinimum {
                code: self.code.clone(),
                minimum: self.minimum_order,
            });
        }

        let discount = match self.kind {
            DiscountKind::Percentage => money::percent_of(subtotal, self.value)?,
            DiscountKind::FixedAmount => money::from_decimal(self.value)?,
        };

        Ok(money::min(discount, *subtotal))
    }
}
