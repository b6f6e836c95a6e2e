//! Order status
//!
//! One closed set of fulfillment states. The backend speaks two vocabularies
//! (Vietnamese display labels and upper-snake machine codes, plus a few
//! stragglers); everything is canonicalised here on the way in and rendered
//! back per surface on the way out.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from reading a status off the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    /// The string matches no known spelling.
    #[error("unknown order status: {0:?}")]
    Unknown(String),
}

/// Canonical fulfillment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    /// Placed, waiting for staff.
    Pending,

    /// Accepted by staff.
    Confirmed,

    /// Handed to the courier.
    Shipping,

    /// Received by the customer.
    Delivered,

    /// Called off.
    Cancelled,
}

/// Which wire vocabulary to write a status in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusVocabulary {
    /// Vietnamese display labels, used by the administrative surface.
    DisplayLabel,

    /// Machine codes, used by the staff surface.
    MachineCode,
}

impl OrderStatus {
    /// Every status, in fulfillment order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipping,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Vietnamese display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Chờ xử lý",
            Self::Confirmed => "Đã xác nhận",
            Self::Shipping => "Đang giao",
            Self::Delivered => "Hoàn thành",
            Self::Cancelled => "Đã hủy",
        }
    }

    /// Machine code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Pending => "CHO_XU_LY",
            Self::Confirmed => "DA_XAC_NHAN",
            Self::Shipping => "DANG_GIAO",
            Self::Delivered => "DA_GIAO",
            Self::Cancelled => "DA_HUY",
        }
    }

    /// The status as written in `vocabulary`.
    pub fn wire(self, vocabulary: StatusVocabulary) -> &'static str {
        match vocabulary {
            StatusVocabulary::DisplayLabel => self.label(),
            StatusVocabulary::MachineCode => self.code(),
        }
    }

    /// Delivered and cancelled orders take no further fulfillment transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The single forward step offered as a quick action.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Shipping),
            Self::Shipping => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether a forward move from `self` lands on `to`, possibly skipping
    /// steps. Cancelling is only reachable before shipping.
    pub fn can_advance_to(self, to: Self) -> bool {
        if to == Self::Cancelled {
            return matches!(self, Self::Pending | Self::Confirmed);
        }

        let mut step = self.next();

        while let Some(status) = step {
            if status == to {
                return true;
            }

            step = status.next();
        }

        false
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase();

        match normalised.as_str() {
            "chờ xử lý" | "cho_xu_ly" | "pending" => Ok(Self::Pending),
            "đã xác nhận" | "da_xac_nhan" | "confirmed" => Ok(Self::Confirmed),
            "đang giao" | "dang_giao" | "shipping" => Ok(Self::Shipping),
            "hoàn thành" | "đã giao" | "da_giao" | "da_thanh_toan" | "delivered" | "completed" => {
                Ok(Self::Delivered)
            }
            "đã hủy" | "đã huỷ" | "da_huy" | "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(StatusError::Unknown(s.to_string())),
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn both_vocabularies_canonicalise() -> TestResult {
        assert_eq!("CHO_XU_LY".parse::<OrderStatus>()?, OrderStatus::Pending);
        assert_eq!("Chờ xử lý".parse::<OrderStatus>()?, OrderStatus::Pending);
        assert_eq!("DA_XAC_NHAN".parse::<OrderStatus>()?, OrderStatus::Confirmed);
        assert_eq!("Đang giao".parse::<OrderStatus>()?, OrderStatus::Shipping);
        assert_eq!("DANG_GIAO".parse::<OrderStatus>()?, OrderStatus::Shipping);
        assert_eq!("Hoàn thành".parse::<OrderStatus>()?, OrderStatus::Delivered);
        assert_eq!("DA_GIAO".parse::<OrderStatus>()?, OrderStatus::Delivered);
        assert_eq!("Đã hủy".parse::<OrderStatus>()?, OrderStatus::Cancelled);
        assert_eq!("DA_HUY".parse::<OrderStatus>()?, OrderStatus::Cancelled);

        Ok(())
    }

    #[test]
    fn stray_spellings_canonicalise() -> TestResult {
        assert_eq!(" Đã giao ".parse::<OrderStatus>()?, OrderStatus::Delivered);
        assert_eq!("DA_THANH_TOAN".parse::<OrderStatus>()?, OrderStatus::Delivered);
        assert_eq!("completed".parse::<OrderStatus>()?, OrderStatus::Delivered);
        assert_eq!("Canceled".parse::<OrderStatus>()?, OrderStatus::Cancelled);
        assert_eq!("cho_xu_ly".parse::<OrderStatus>()?, OrderStatus::Pending);

        Ok(())
    }

    #[test]
    fn unknown_spelling_is_an_error() {
        assert_eq!(
            "LOST".parse::<OrderStatus>(),
            Err(StatusError::Unknown("LOST".into()))
        );
    }

    #[test]
    fn labels_and_codes_read_back() -> TestResult {
        for status in OrderStatus::ALL {
            assert_eq!(status.label().parse::<OrderStatus>()?, status);
            assert_eq!(status.code().parse::<OrderStatus>()?, status);
        }

        Ok(())
    }

    #[test]
    fn terminal_states_have_no_next_step() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Confirmed));
        assert_eq!(OrderStatus::Confirmed.next(), Some(OrderStatus::Shipping));
        assert_eq!(OrderStatus::Shipping.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
    }

    #[test]
    fn forward_table() {
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_advance_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipping.can_advance_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Shipping));
        assert!(!OrderStatus::Shipping.can_advance_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Confirmed.can_advance_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Confirmed.can_advance_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_advance_to(OrderStatus::Cancelled));
    }

    #[test]
    fn deserializes_through_canonicaliser() -> TestResult {
        let status: OrderStatus = serde_json::from_str("\"Đang giao\"")?;

        assert_eq!(status, OrderStatus::Shipping);
        assert_eq!(serde_json::to_string(&status)?, "\"DANG_GIAO\"");

        Ok(())
    }
}
