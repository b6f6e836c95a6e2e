//! Order Creation Dispatcher
//!
//! [`prepare_order`] performs every check that must pass before a creation
//! request may be sent and picks the creation route. [`CheckoutStage`] then
//! tracks what happens after the backend accepts the order.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;

use crate::{
    checkout::{
        CheckoutError,
        payment::{self, PaymentMethod, QrPayment},
        session::CheckoutHandOff,
    },
    ids::{OrderId, ProductId, UserId},
    money::Amount,
    vouchers::VoucherCode,
};

/// Who is placing the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buyer {
    /// No authenticated session.
    Guest,

    /// Signed-in customer.
    Member {
        /// Registered user id
        user_id: UserId,
    },
}

impl Buyer {
    /// Whether the buyer has an authenticated session.
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Member { .. })
    }
}

/// Mandatory shipping form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingField {
    /// Recipient full name
    RecipientName,

    /// Contact phone
    Phone,

    /// Contact email, guests only
    Email,

    /// Province or city
    Province,

    /// District
    District,

    /// Ward
    Ward,

    /// Street address
    StreetAddress,
}

impl Display for ShippingField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::RecipientName => "recipient name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Province => "province",
            Self::District => "district",
            Self::Ward => "ward",
            Self::StreetAddress => "street address",
        })
    }
}

/// The shipping form as filled in by the buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    /// Recipient full name
    pub recipient_name: String,

    /// Contact phone
    pub phone: String,

    /// Contact email
    pub email: String,

    /// Province or city
    pub province: String,

    /// District
    pub district: String,

    /// Ward
    pub ward: String,

    /// Street address
    pub street_address: String,
}

impl ShippingDetails {
    /// Blank mandatory fields, in form order.
    pub fn missing_fields(&self, buyer: Buyer) -> Vec<ShippingField> {
        [
            (ShippingField::RecipientName, &self.recipient_name, true),
            (ShippingField::Phone, &self.phone, true),
            (ShippingField::Email, &self.email, !buyer.is_authenticated()),
            (ShippingField::Province, &self.province, true),
            (ShippingField::District, &self.district, true),
            (ShippingField::Ward, &self.ward, true),
            (ShippingField::StreetAddress, &self.street_address, true),
        ]
        .into_iter()
        .filter(|(_, value, required)| *required && value.trim().is_empty())
        .map(|(field, _, _)| field)
        .collect()
    }
}

/// Which creation endpoint receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationRoute {
    /// Guest endpoint, carries an email.
    Guest,

    /// Member endpoint, carries the user id.
    Member(UserId),
}

/// One line of an order draft. Prices are set by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftLine {
    /// Product
    pub product_id: ProductId,

    /// Units
    pub quantity: u32,
}

/// A validated order ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    /// Creation endpoint
    pub route: CreationRoute,

    /// Shipping form
    pub details: ShippingDetails,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Voucher to redeem, only when its discount was honoured
    pub voucher_code: Option<VoucherCode>,

    /// Lines to order
    pub lines: Vec<DraftLine>,

    /// Free-text note
    pub note: Option<String>,

    /// Total the buyer was shown
    pub total: Amount,
}

/// Validate the checkout form and build the order to send.
///
/// Checks run in this order and nothing is sent when one fails: a non-empty
/// selection, the mandatory shipping fields, then the guest payment restriction.
///
/// # Errors
///
/// - [`CheckoutError::EmptySelection`] when no line was carried forward.
/// - [`CheckoutError::MissingFields`] listing every blank mandatory field.
/// - [`CheckoutError::GuestCodUnsupported`] for a guest paying cash on delivery.
pub fn prepare_order(
    hand_off: &CheckoutHandOff,
    details: ShippingDetails,
    buyer: Buyer,
    payment_method: PaymentMethod,
    note: Option<String>,
) -> Result<OrderDraft, CheckoutError> {
    if hand_off.lines().is_empty() {
        return Err(CheckoutError::EmptySelection);
    }

    let missing = details.missing_fields(buyer);

    if !missing.is_empty() {
        return Err(CheckoutError::MissingFields(missing));
    }

    let route = match buyer {
        Buyer::Guest if !payment_method.is_online() => {
            return Err(CheckoutError::GuestCodUnsupported);
        }
        Buyer::Guest => CreationRoute::Guest,
        Buyer::Member { user_id } => CreationRoute::Member(user_id),
    };

    let voucher_code = hand_off
        .honoured_voucher()?
        .map(|applied| applied.code().clone());

    Ok(OrderDraft {
        route,
        details,
        payment_method,
        voucher_code,
        lines: hand_off
            .lines()
            .iter()
            .map(|line| DraftLine {
                product_id: line.product_id(),
                quantity: line.quantity(),
            })
            .collect(),
        note: note.filter(|note| !note.trim().is_empty()),
        total: hand_off.summary()?.total,
    })
}

/// Where a checkout attempt stands after submission.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStage {
    /// The form is being filled in or a failed attempt can be retried.
    Editing,

    /// The order exists and the QR payment is showing.
    AwaitingPayment(QrPayment),

    /// The order is final; local cart state must be cleared.
    Completed {
        /// Order identifier shown to the buyer
        order_reference: String,
    },
}

impl CheckoutStage {
    /// Stage after the backend accepted `draft`.
    ///
    /// Cash orders complete immediately. Online orders wait for the buyer to
    /// confirm the transfer.
    pub fn on_created(draft: &OrderDraft, created: Option<OrderId>, now: Timestamp) -> Self {
        let order_reference = payment::order_reference(created, now);

        if draft.payment_method.is_online() {
            Self::AwaitingPayment(QrPayment::new(
                draft.payment_method,
                order_reference,
                draft.total,
            ))
        } else {
            Self::Completed { order_reference }
        }
    }

    /// The buyer confirmed the transfer.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAwaitingPayment`] outside the payment step.
    pub fn confirm_payment(self) -> Result<Self, CheckoutError> {
        match self {
            Self::AwaitingPayment(payment) => Ok(Self::Completed {
                order_reference: payment.order_reference().to_string(),
            }),
            _ => Err(CheckoutError::NotAwaitingPayment),
        }
    }

    /// The buyer closed the payment step without confirming. The order stays
    /// created and the cart is left alone.
    pub fn dismiss(self) -> Self {
        match self {
            Self::AwaitingPayment(_) => Self::Editing,
            other => other,
        }
    }

    /// Whether local cart state should now be cleared.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        cart::{Cart, tests::line},
        checkout::session::CheckoutSession,
        money::vnd,
        vouchers::engine::ValidationOutcome,
    };

    use super::*;

    fn details() -> ShippingDetails {
        ShippingDetails {
            recipient_name: "Nguyễn Văn A".into(),
            phone: "0901234567".into(),
            email: "a@example.com".into(),
            province: "Hà Nội".into(),
            district: "Cầu Giấy".into(),
            ward: "Dịch Vọng".into(),
            street_address: "1 Xuân Thủy".into(),
        }
    }

    fn hand_off() -> Result<CheckoutHandOff, CheckoutError> {
        let mut session = CheckoutSession::new(Cart::with_lines([
            line(1, 200_000, 2, 1),
            line(2, 100_000, 1, 2),
        ])?);

        session.select_all(true)?;

        let ticket = session.begin_voucher("sale50k")?;
        session.complete_voucher(ticket, ValidationOutcome::Discount(vnd(50_000)))?;

        session.hand_off()
    }

    fn member() -> Buyer {
        Buyer::Member {
            user_id: UserId::new(7),
        }
    }

    #[test]
    fn member_draft_carries_lines_voucher_and_total() -> TestResult {
        let draft = prepare_order(&hand_off()?, details(), member(), PaymentMethod::Cod, None)?;

        assert_eq!(draft.route, CreationRoute::Member(UserId::new(7)));
        assert_eq!(draft.voucher_code.as_ref().map(VoucherCode::as_str), Some("SALE50K"));
        assert_eq!(draft.total, vnd(480_000));
        assert_eq!(
            draft.lines,
            vec![
                DraftLine {
                    product_id: ProductId::new(10),
                    quantity: 2
                },
                DraftLine {
                    product_id: ProductId::new(20),
                    quantity: 1
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn guest_cod_is_rejected() -> TestResult {
        let result = prepare_order(&hand_off()?, details(), Buyer::Guest, PaymentMethod::Cod, None);

        assert_eq!(result, Err(CheckoutError::GuestCodUnsupported));

        Ok(())
    }

    #[test]
    fn guest_online_uses_guest_route() -> TestResult {
        let draft = prepare_order(&hand_off()?, details(), Buyer::Guest, PaymentMethod::Momo, None)?;

        assert_eq!(draft.route, CreationRoute::Guest);

        Ok(())
    }

    #[test]
    fn email_is_only_required_for_guests() -> TestResult {
        let mut form = details();
        form.email = String::new();

        assert!(prepare_order(&hand_off()?, form.clone(), member(), PaymentMethod::Cod, None).is_ok());
        assert_eq!(
            prepare_order(&hand_off()?, form, Buyer::Guest, PaymentMethod::Momo, None),
            Err(CheckoutError::MissingFields(vec![ShippingField::Email]))
        );

        Ok(())
    }

    #[test]
    fn missing_fields_are_reported_before_payment_restriction() -> TestResult {
        let mut form = details();
        form.ward = "  ".into();
        form.phone = String::new();

        assert_eq!(
            prepare_order(&hand_off()?, form, Buyer::Guest, PaymentMethod::Cod, None),
            Err(CheckoutError::MissingFields(vec![
                ShippingField::Phone,
                ShippingField::Ward
            ]))
        );

        Ok(())
    }

    #[test]
    fn empty_hand_off_is_rejected() {
        let empty = CheckoutHandOff::new(Vec::new(), None);

        assert_eq!(
            prepare_order(&empty, details(), member(), PaymentMethod::Cod, None),
            Err(CheckoutError::EmptySelection)
        );
    }

    #[test]
    fn cod_completes_immediately() -> TestResult {
        let draft = prepare_order(&hand_off()?, details(), member(), PaymentMethod::Cod, None)?;
        let stage = CheckoutStage::on_created(&draft, Some(OrderId::new(9)), Timestamp::UNIX_EPOCH);

        assert_eq!(
            stage,
            CheckoutStage::Completed {
                order_reference: "9".into()
            }
        );

        Ok(())
    }

    #[test]
    fn online_payment_waits_for_confirmation() -> TestResult {
        let draft = prepare_order(&hand_off()?, details(), Buyer::Guest, PaymentMethod::Vnpay, None)?;
        let stage = CheckoutStage::on_created(&draft, None, Timestamp::from_millisecond(5)?);

        let CheckoutStage::AwaitingPayment(payment) = &stage else {
            panic!("Expected a payment step");
        };

        assert_eq!(payment.memo(), "VNPAY MDH5");
        assert_eq!(payment.amount(), vnd(480_000));
        assert!(!stage.is_completed());

        let confirmed = stage.confirm_payment()?;

        assert!(confirmed.is_completed());
        assert_eq!(
            confirmed.confirm_payment(),
            Err(CheckoutError::NotAwaitingPayment)
        );

        Ok(())
    }

    #[test]
    fn dismissing_payment_returns_to_editing() {
        let stage = CheckoutStage::AwaitingPayment(QrPayment::new(PaymentMethod::Momo, "1", vnd(1)));

        assert_eq!(stage.dismiss(), CheckoutStage::Editing);
    }
}
