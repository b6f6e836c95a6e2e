//! Payment methods and the QR payment step

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ids::OrderId, money::Amount};

const QR_IMAGE_BASE: &str = "https://img.vietqr.io/image/MB-0969696969-compact2.png";

/// A payment method name that is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,

    /// MoMo wallet
    Momo,

    /// VNPAY
    Vnpay,
}

impl PaymentMethod {
    /// Wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Momo => "MOMO",
            Self::Vnpay => "VNPAY",
        }
    }

    /// Whether the order must be paid through the QR step before it is final.
    pub fn is_online(self) -> bool {
        !matches!(self, Self::Cod)
    }

    /// Preselected method: members default to cash on delivery, guests to MoMo.
    pub fn default_for(authenticated: bool) -> Self {
        if authenticated { Self::Cod } else { Self::Momo }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COD" => Ok(Self::Cod),
            "MOMO" => Ok(Self::Momo),
            "VNPAY" => Ok(Self::Vnpay),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Identifier shown in the payment memo: the created order's id, or
/// `MDH{unix millis}` when the backend did not return one.
pub fn order_reference(created: Option<OrderId>, now: Timestamp) -> String {
    created.map_or_else(
        || format!("MDH{}", now.as_millisecond()),
        |id| id.to_string(),
    )
}

/// A bank-transfer QR code awaiting manual confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct QrPayment {
    method: PaymentMethod,
    order_reference: String,
    amount: Amount,
}

impl QrPayment {
    /// Create the payment step for an online order.
    pub fn new(method: PaymentMethod, order_reference: impl Into<String>, amount: Amount) -> Self {
        Self {
            method,
            order_reference: order_reference.into(),
            amount,
        }
    }

    /// Payment method shown in the memo.
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Order identifier shown in the memo.
    pub fn order_reference(&self) -> &str {
        &self.order_reference
    }

    /// Amount to transfer.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Transfer memo, e.g. `MOMO 123`.
    pub fn memo(&self) -> String {
        format!("{} {}", self.method, self.order_reference)
    }

    /// VietQR image URL encoding the amount and memo.
    pub fn image_url(&self) -> String {
        format!(
            "{QR_IMAGE_BASE}?amount={}&addInfo={}%20{}",
            self.amount.to_minor_units(),
            self.method,
            self.order_reference
        )
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::money::vnd;

    use super::*;

    #[test]
    fn default_method_depends_on_session() {
        assert_eq!(PaymentMethod::default_for(true), PaymentMethod::Cod);
        assert_eq!(PaymentMethod::default_for(false), PaymentMethod::Momo);
    }

    #[test]
    fn methods_parse_case_insensitively() -> TestResult {
        assert_eq!(" vnpay ".parse::<PaymentMethod>()?, PaymentMethod::Vnpay);
        assert!("CASH".parse::<PaymentMethod>().is_err());

        Ok(())
    }

    #[test]
    fn methods_serialize_as_wire_codes() -> TestResult {
        assert_eq!(serde_json::to_string(&PaymentMethod::Momo)?, "\"MOMO\"");

        Ok(())
    }

    #[test]
    fn reference_falls_back_to_timestamp() -> TestResult {
        let now = Timestamp::from_millisecond(1_700_000_000_123)?;

        assert_eq!(order_reference(Some(OrderId::new(42)), now), "42");
        assert_eq!(order_reference(None, now), "MDH1700000000123");

        Ok(())
    }

    #[test]
    fn qr_url_carries_amount_and_memo() {
        let payment = QrPayment::new(PaymentMethod::Momo, "42", vnd(480_000));

        assert_eq!(payment.memo(), "MOMO 42");
        assert_eq!(
            payment.image_url(),
            "https://img.vietqr.io/image/MB-0969696969-compact2.png?amount=480000&addInfo=MOMO%2042"
        );
    }
}
