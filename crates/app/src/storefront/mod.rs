//! Storefront
//!
//! The buyer side: the cart page, voucher application and checkout. Local
//! state lives behind a mutex that is never held across a request; responses
//! that arrive after a newer request was issued are dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, info, warn};

use petlor::{
    cart::{
        Cart, CartLine,
        quantity::{self, QuantityChange},
        selection::RemovalPlan,
    },
    checkout::{
        CheckoutError,
        dispatch::{Buyer, CheckoutStage, ShippingDetails, prepare_order},
        payment::PaymentMethod,
        session::{CheckoutSession, CheckoutSummary},
    },
    ids::CartLineId,
    money::{Amount, PricingError},
    vouchers::{VoucherError, engine::ValidationOutcome},
};

use crate::{
    carts::{CartsService, CartsServiceError},
    orders::OrdersService,
    vouchers::VouchersService,
};

/// Shown when the voucher validator gives no reason.
pub const VOUCHER_FAILED: &str = "Lỗi khi áp dụng mã khuyến mãi!";

/// Shown when order creation fails without a reason.
pub const ORDER_FAILED: &str = "Đặt hàng thất bại. Vui lòng thử lại!";

/// Storefront errors.
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Voucher(#[from] VoucherError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    #[error("cart line {0} is not in the cart")]
    UnknownLine(CartLineId),

    /// Order creation failed; carries the server's message or [`ORDER_FAILED`].
    #[error("{0}")]
    OrderRejected(String),

    #[error("storefront state is unavailable")]
    Poisoned,
}

#[derive(Debug)]
struct StorefrontState {
    session: CheckoutSession,
    stage: CheckoutStage,
}

pub struct Storefront {
    carts: Arc<dyn CartsService>,
    vouchers: Arc<dyn VouchersService>,
    orders: Arc<dyn OrdersService>,
    buyer: Buyer,
    state: Mutex<StorefrontState>,
}

impl Storefront {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsService>,
        vouchers: Arc<dyn VouchersService>,
        orders: Arc<dyn OrdersService>,
        buyer: Buyer,
    ) -> Self {
        Self {
            carts,
            vouchers,
            orders,
            buyer,
            state: Mutex::new(StorefrontState {
                session: CheckoutSession::default(),
                stage: CheckoutStage::Editing,
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, StorefrontState>, StorefrontError> {
        self.state
            .lock()
            .map_err(|_poisoned| StorefrontError::Poisoned)
    }

    /// Who is checking out.
    pub fn buyer(&self) -> Buyer {
        self.buyer
    }

    /// Payment method preselected on the checkout form.
    pub fn default_payment_method(&self) -> PaymentMethod {
        PaymentMethod::default_for(self.buyer.is_authenticated())
    }

    /// Run `f` against the local checkout session.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Poisoned`] if a previous holder panicked.
    pub fn with_session<T>(
        &self,
        f: impl FnOnce(&CheckoutSession) -> T,
    ) -> Result<T, StorefrontError> {
        Ok(f(&self.state()?.session))
    }

    /// Current cart page summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the amounts cannot be computed.
    pub fn summary(&self) -> Result<CheckoutSummary, StorefrontError> {
        Ok(self.state()?.session.summary()?)
    }

    /// Where the checkout attempt stands.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Poisoned`] if a previous holder panicked.
    pub fn stage(&self) -> Result<CheckoutStage, StorefrontError> {
        Ok(self.state()?.stage.clone())
    }

    /// Replace the cart with one held locally, e.g. a guest's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the new subtotal cannot be computed.
    pub fn load_cart(&self, cart: Cart) -> Result<(), StorefrontError> {
        Ok(self.state()?.session.replace_cart(cart)?)
    }

    /// Refetch the member cart. A refetch overtaken by a newer one is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be fetched.
    #[tracing::instrument(name = "storefront.refresh_cart", skip(self), err)]
    pub async fn refresh_cart(&self) -> Result<bool, StorefrontError> {
        let ticket = self.state()?.session.begin_refresh();

        let cart = self.carts.get_cart().await?;

        let applied = self.state()?.session.complete_refresh(ticket, cart)?;

        if !applied {
            debug!(?ticket, "dropped stale cart response");
        }

        Ok(applied)
    }

    /// Flip whether a line is checked out.
    ///
    /// # Errors
    ///
    /// Returns an error if the new subtotal cannot be computed.
    pub fn toggle(&self, id: CartLineId) -> Result<bool, StorefrontError> {
        Ok(self.state()?.session.toggle(id)?)
    }

    /// Check out every line, or none.
    ///
    /// # Errors
    ///
    /// Returns an error if the new subtotal cannot be computed.
    pub fn select_all(&self, flag: bool) -> Result<(), StorefrontError> {
        Ok(self.state()?.session.select_all(flag)?)
    }

    /// Add one unit of a line. Guest carts change locally only.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown or the backend refuses.
    pub async fn increase_quantity(&self, id: CartLineId) -> Result<(), StorefrontError> {
        let line = self.line(id)?;

        let QuantityChange::NewQuantity(quantity) = quantity::increase_quantity(&line) else {
            return Ok(());
        };

        self.write_quantity(&line, quantity).await
    }

    /// Take one unit off a line. At one unit nothing is sent and
    /// [`QuantityChange::RequestRemoval`] is returned so the caller can ask
    /// before calling [`Storefront::remove_line`].
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown or the backend refuses.
    pub async fn decrease_quantity(&self, id: CartLineId) -> Result<QuantityChange, StorefrontError> {
        let line = self.line(id)?;
        let change = quantity::decrease_quantity(&line);

        if let QuantityChange::NewQuantity(quantity) = change {
            self.write_quantity(&line, quantity).await?;
        }

        Ok(change)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown or the backend refuses.
    pub async fn remove_line(&self, id: CartLineId) -> Result<(), StorefrontError> {
        let line = self.line(id)?;

        if !self.buyer.is_authenticated() {
            self.state()?.session.remove_line(id)?;

            return Ok(());
        }

        self.carts.remove_product(line.product_id()).await?;
        self.refresh_cart().await?;

        Ok(())
    }

    /// Remove every selected line: one clear when everything is selected,
    /// otherwise one removal per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses. Removals already made stay made.
    #[tracing::instrument(name = "storefront.delete_selected", skip(self), err)]
    pub async fn delete_selected(&self) -> Result<(), StorefrontError> {
        let plan = self.state()?.session.removal_plan();

        if !self.buyer.is_authenticated() {
            let mut state = self.state()?;

            match plan {
                RemovalPlan::Nothing => {}
                RemovalPlan::ClearCart => state.session.clear_cart(),
                RemovalPlan::RemoveLines(lines) => {
                    for (id, _) in lines {
                        state.session.remove_line(id)?;
                    }
                }
            }

            return Ok(());
        }

        match plan {
            RemovalPlan::Nothing => return Ok(()),
            RemovalPlan::ClearCart => self.carts.clear_cart().await?,
            RemovalPlan::RemoveLines(lines) => {
                for (_, product) in lines {
                    self.carts.remove_product(product).await?;
                }
            }
        }

        self.refresh_cart().await?;

        Ok(())
    }

    /// Validate `raw_code` against the current selection and hold the discount.
    ///
    /// # Errors
    ///
    /// - [`VoucherError::NoSelection`] or [`VoucherError::EmptyCode`] before any
    ///   request.
    /// - [`VoucherError::ZeroDiscount`] or [`VoucherError::Rejected`]; any held
    ///   discount is cleared.
    /// - [`VoucherError::Superseded`] if the selection changed or another code
    ///   was submitted meanwhile.
    #[tracing::instrument(name = "storefront.apply_voucher", skip(self), err)]
    pub async fn apply_voucher(&self, raw_code: &str) -> Result<Amount, StorefrontError> {
        let ticket = self.state()?.session.begin_voucher(raw_code)?;

        let outcome = match self
            .vouchers
            .validate(ticket.code().clone(), ticket.subtotal())
            .await
        {
            Ok(amount) => ValidationOutcome::Discount(amount),
            Err(error) => {
                warn!(code = %ticket.code(), %error, "voucher validation failed");

                ValidationOutcome::Rejected(error.user_message(VOUCHER_FAILED))
            }
        };

        let code = ticket.code().clone();
        let applied = self.state()?.session.complete_voucher(ticket, outcome);

        match &applied {
            Ok(discount) => info!(%code, amount = %discount.amount(), "voucher applied"),
            Err(VoucherError::Superseded(_)) => debug!(%code, "dropped stale voucher response"),
            Err(error) => info!(%code, %error, "voucher not applied"),
        }

        Ok(applied?.amount())
    }

    /// Drop the held voucher.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Poisoned`] if a previous holder panicked.
    pub fn clear_voucher(&self) -> Result<(), StorefrontError> {
        self.state()?.session.clear_voucher();

        Ok(())
    }

    /// Submit the checkout form.
    ///
    /// Input problems are reported before any request. Cash orders complete
    /// immediately and clear the cart; online orders move to the payment step
    /// and leave the cart alone. On failure the selection and form stay as
    /// they were.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Checkout`] for an empty selection, blank fields, or
    ///   a guest paying cash on delivery.
    /// - [`StorefrontError::OrderRejected`] with the server's message or
    ///   [`ORDER_FAILED`].
    #[tracing::instrument(name = "storefront.place_order", skip(self, details, note), err)]
    pub async fn place_order(
        &self,
        details: ShippingDetails,
        payment_method: PaymentMethod,
        note: Option<String>,
    ) -> Result<CheckoutStage, StorefrontError> {
        let draft = {
            let state = self.state()?;
            let hand_off = state.session.hand_off()?;

            prepare_order(&hand_off, details, self.buyer, payment_method, note)?
        };

        let created = self
            .orders
            .create_order(draft.clone())
            .await
            .map_err(|error| {
                warn!(%error, "order creation failed");

                StorefrontError::OrderRejected(error.user_message(ORDER_FAILED))
            })?;

        let stage = CheckoutStage::on_created(&draft, created, Timestamp::now());

        info!(
            order_id = ?created,
            method = %payment_method,
            total = %draft.total,
            "order created"
        );

        self.enter(stage.clone()).await?;

        Ok(stage)
    }

    /// The buyer confirmed the QR transfer.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAwaitingPayment`] outside the payment step.
    #[tracing::instrument(name = "storefront.confirm_payment", skip(self), err)]
    pub async fn confirm_payment(&self) -> Result<CheckoutStage, StorefrontError> {
        let stage = self.state()?.stage.clone().confirm_payment()?;

        info!("payment confirmed");

        self.enter(stage.clone()).await?;

        Ok(stage)
    }

    /// The buyer closed the payment step without confirming.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Poisoned`] if a previous holder panicked.
    pub fn dismiss_payment(&self) -> Result<CheckoutStage, StorefrontError> {
        let mut state = self.state()?;

        state.stage = state.stage.clone().dismiss();

        Ok(state.stage.clone())
    }

    async fn enter(&self, stage: CheckoutStage) -> Result<(), StorefrontError> {
        let completed = stage.is_completed();

        {
            let mut state = self.state()?;

            state.stage = stage;

            if completed {
                state.session.finish_order();
            }
        }

        if completed && self.buyer.is_authenticated() {
            self.refresh_cart().await?;
        }

        Ok(())
    }

    /// Members write through to the backend and refetch; a guest cart only
    /// lives here.
    async fn write_quantity(&self, line: &CartLine, quantity: u32) -> Result<(), StorefrontError> {
        if !self.buyer.is_authenticated() {
            self.state()?.session.set_quantity(line.id(), quantity)?;

            return Ok(());
        }

        self.carts.update_quantity(line.product_id(), quantity).await?;
        self.refresh_cart().await?;

        Ok(())
    }

    fn line(&self, id: CartLineId) -> Result<CartLine, StorefrontError> {
        self.state()?
            .session
            .store()
            .cart()
            .line(id)
            .cloned()
            .ok_or(StorefrontError::UnknownLine(id))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use petlor::{
        checkout::dispatch::CreationRoute,
        ids::{OrderId, ProductId, UserId},
        money::vnd,
        vouchers::VoucherCode,
    };
    use reqwest::StatusCode;
    use testresult::TestResult;

    use crate::{
        api::ApiError,
        carts::MockCartsService,
        orders::{MockOrdersService, OrdersServiceError},
        vouchers::{MockVouchersService, VouchersServiceError},
    };

    use super::*;

    const MEMBER: Buyer = Buyer::Member {
        user_id: UserId::new(3),
    };

    fn cart() -> Result<Cart, petlor::cart::CartError> {
        let line = |id: i64, price: i64, quantity: u32, day: i8| {
            CartLine::new(
                CartLineId::new(id),
                ProductId::new(100 + id),
                format!("Product {id}"),
                vnd(price),
                quantity,
                date(2025, 3, day).at(9, 0, 0, 0),
            )
        };

        Cart::with_lines(vec![
            line(1, 100_000, 2, 1)?,
            line(2, 150_000, 2, 3)?,
            line(3, 25_000, 1, 2)?,
        ])
    }

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

    fn strict_carts() -> MockCartsService {
        let mut carts = MockCartsService::new();

        carts.expect_get_cart().never();
        carts.expect_update_quantity().never();
        carts.expect_remove_product().never();
        carts.expect_clear_cart().never();

        carts
    }

    fn strict_vouchers() -> MockVouchersService {
        let mut vouchers = MockVouchersService::new();

        vouchers.expect_validate().never();
        vouchers.expect_list_vouchers().never();

        vouchers
    }

    fn strict_orders() -> MockOrdersService {
        let mut orders = MockOrdersService::new();

        orders.expect_create_order().never();
        orders.expect_list_orders().never();
        orders.expect_get_order().never();
        orders.expect_update_status().never();
        orders.expect_delete_order().never();

        orders
    }

    fn storefront(
        carts: MockCartsService,
        vouchers: MockVouchersService,
        orders: MockOrdersService,
        buyer: Buyer,
    ) -> Result<Storefront, Box<dyn std::error::Error>> {
        let storefront = Storefront::new(Arc::new(carts), Arc::new(vouchers), Arc::new(orders), buyer);

        storefront.load_cart(cart()?)?;
        storefront.toggle(CartLineId::new(1))?;
        storefront.toggle(CartLineId::new(2))?;

        Ok(storefront)
    }

    #[tokio::test]
    async fn test_voucher_discount_is_dropped_when_selection_changes() -> TestResult {
        let mut vouchers = MockVouchersService::new();

        vouchers
            .expect_validate()
            .once()
            .withf(|code, value| code.as_str() == "SALE50K" && *value == vnd(500_000))
            .return_once(|_, _| Ok(vnd(50_000)));

        vouchers.expect_list_vouchers().never();

        let storefront = storefront(strict_carts(), vouchers, strict_orders(), MEMBER)?;

        assert_eq!(storefront.apply_voucher(" sale50k ").await?, vnd(50_000));
        assert_eq!(storefront.summary()?.total, vnd(480_000));

        storefront.toggle(CartLineId::new(1))?;

        let summary = storefront.summary()?;

        assert_eq!(summary.subtotal, vnd(300_000));
        assert_eq!(summary.discount, vnd(0));
        assert_eq!(summary.total, vnd(330_000));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_voucher_clears_held_discount() -> TestResult {
        let mut vouchers = MockVouchersService::new();

        vouchers
            .expect_validate()
            .once()
            .withf(|code, _| code.as_str() == "SALE50K")
            .return_once(|_, _| Ok(vnd(50_000)));

        vouchers
            .expect_validate()
            .once()
            .withf(|code, _| code.as_str() == "WINTER24")
            .return_once(|_, _| {
                Err(VouchersServiceError::Api(ApiError::Rejected {
                    status: StatusCode::BAD_REQUEST,
                    message: Some("Mã khuyến mãi đã hết hạn".into()),
                }))
            });

        vouchers.expect_list_vouchers().never();

        let storefront = storefront(strict_carts(), vouchers, strict_orders(), MEMBER)?;

        storefront.apply_voucher("SALE50K").await?;

        let result = storefront.apply_voucher("WINTER24").await;

        let Err(StorefrontError::Voucher(VoucherError::Rejected { reason, .. })) = result else {
            panic!("Expected a rejection");
        };

        assert_eq!(reason, "Mã khuyến mãi đã hết hạn");
        assert_eq!(storefront.summary()?.discount, vnd(0));

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_discount_is_an_error() -> TestResult {
        let mut vouchers = MockVouchersService::new();

        vouchers
            .expect_validate()
            .once()
            .return_once(|_, _| Ok(vnd(0)));

        vouchers.expect_list_vouchers().never();

        let storefront = storefront(strict_carts(), vouchers, strict_orders(), MEMBER)?;

        assert!(matches!(
            storefront.apply_voucher("FREESHIP").await,
            Err(StorefrontError::Voucher(VoucherError::ZeroDiscount(_)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_voucher_without_selection_sends_nothing() -> TestResult {
        let storefront = storefront(strict_carts(), strict_vouchers(), strict_orders(), MEMBER)?;

        storefront.select_all(false)?;

        assert!(matches!(
            storefront.apply_voucher("SALE50K").await,
            Err(StorefrontError::Checkout(CheckoutError::Voucher(
                VoucherError::NoSelection
            )))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_cash_on_delivery_sends_nothing() -> TestResult {
        let storefront = storefront(strict_carts(), strict_vouchers(), strict_orders(), Buyer::Guest)?;

        let result = storefront
            .place_order(details(), PaymentMethod::Cod, None)
            .await;

        assert!(matches!(
            result,
            Err(StorefrontError::Checkout(CheckoutError::GuestCodUnsupported))
        ));
        assert_eq!(storefront.stage()?, CheckoutStage::Editing);
        assert_eq!(
            storefront.with_session(|session| session.store().selection().len())?,
            2
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_member_cash_order_completes_and_refetches() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_get_cart().once().return_once(|| Ok(Cart::new()));
        carts.expect_update_quantity().never();
        carts.expect_remove_product().never();
        carts.expect_clear_cart().never();

        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .withf(|draft| {
                draft.route == CreationRoute::Member(UserId::new(3))
                    && draft.lines.len() == 2
                    && draft.total == vnd(530_000)
            })
            .return_once(|_| Ok(Some(OrderId::new(77))));

        orders.expect_list_orders().never();
        orders.expect_get_order().never();
        orders.expect_update_status().never();
        orders.expect_delete_order().never();

        let storefront = storefront(carts, strict_vouchers(), orders, MEMBER)?;

        assert_eq!(storefront.default_payment_method(), PaymentMethod::Cod);

        let stage = storefront
            .place_order(details(), PaymentMethod::Cod, None)
            .await?;

        assert_eq!(
            stage,
            CheckoutStage::Completed {
                order_reference: "77".into()
            }
        );
        assert!(storefront.with_session(|session| session.store().cart().is_empty())?);

        Ok(())
    }

    #[tokio::test]
    async fn test_online_order_waits_for_confirmation() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .withf(|draft| draft.voucher_code == VoucherCode::parse("SALE50K").ok())
            .return_once(|_| Ok(Some(OrderId::new(5))));

        orders.expect_list_orders().never();
        orders.expect_get_order().never();
        orders.expect_update_status().never();
        orders.expect_delete_order().never();

        let mut vouchers = MockVouchersService::new();

        vouchers
            .expect_validate()
            .once()
            .return_once(|_, _| Ok(vnd(50_000)));

        vouchers.expect_list_vouchers().never();

        let storefront = storefront(strict_carts(), vouchers, orders, MEMBER)?;

        storefront.apply_voucher("SALE50K").await?;

        let stage = storefront
            .place_order(details(), PaymentMethod::Vnpay, Some("  ".into()))
            .await?;

        let CheckoutStage::AwaitingPayment(payment) = &stage else {
            panic!("Expected a payment step");
        };

        assert_eq!(payment.amount(), vnd(480_000));
        assert_eq!(payment.memo(), "VNPAY 5");
        assert_eq!(
            storefront.with_session(|session| session.store().cart().len())?,
            3
        );

        assert_eq!(storefront.dismiss_payment()?, CheckoutStage::Editing);
        assert!(matches!(
            storefront.confirm_payment().await,
            Err(StorefrontError::Checkout(CheckoutError::NotAwaitingPayment))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirming_guest_payment_clears_the_local_cart() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .return_once(|_| Ok(None));

        orders.expect_list_orders().never();
        orders.expect_get_order().never();
        orders.expect_update_status().never();
        orders.expect_delete_order().never();

        let storefront = storefront(strict_carts(), strict_vouchers(), orders, Buyer::Guest)?;

        let stage = storefront
            .place_order(details(), storefront.default_payment_method(), None)
            .await?;

        let CheckoutStage::AwaitingPayment(payment) = stage else {
            panic!("Expected a payment step");
        };

        assert!(payment.order_reference().starts_with("MDH"));

        let stage = storefront.confirm_payment().await?;

        assert!(stage.is_completed());
        assert!(storefront.with_session(|session| session.store().cart().is_empty())?);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_order_keeps_selection() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_create_order().once().return_once(|_| {
            Err(OrdersServiceError::Api(ApiError::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: None,
            }))
        });

        orders.expect_list_orders().never();
        orders.expect_get_order().never();
        orders.expect_update_status().never();
        orders.expect_delete_order().never();

        let storefront = storefront(strict_carts(), strict_vouchers(), orders, MEMBER)?;

        let result = storefront
            .place_order(details(), PaymentMethod::Cod, None)
            .await;

        let Err(StorefrontError::OrderRejected(message)) = result else {
            panic!("Expected a rejection");
        };

        assert_eq!(message, ORDER_FAILED);
        assert_eq!(storefront.stage()?, CheckoutStage::Editing);
        assert_eq!(
            storefront.with_session(|session| session.store().selection().len())?,
            2
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_selected_clears_when_everything_is_selected() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_clear_cart().once().return_once(|| Ok(()));
        carts.expect_get_cart().once().return_once(|| Ok(Cart::new()));
        carts.expect_update_quantity().never();
        carts.expect_remove_product().never();

        let storefront = storefront(carts, strict_vouchers(), strict_orders(), MEMBER)?;

        storefront.select_all(true)?;
        storefront.delete_selected().await?;

        assert_eq!(storefront.summary()?.selected_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_selected_removes_each_line() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_remove_product()
            .times(2)
            .withf(|product| *product == ProductId::new(101) || *product == ProductId::new(102))
            .returning(|_| Ok(()));

        carts.expect_get_cart().once().return_once(cart_without_selected);
        carts.expect_update_quantity().never();
        carts.expect_clear_cart().never();

        let storefront = storefront(carts, strict_vouchers(), strict_orders(), MEMBER)?;

        storefront.delete_selected().await?;

        let stats = storefront.with_session(|session| session.stats())??;

        assert_eq!(stats.selected_count, 0);

        Ok(())
    }

    fn cart_without_selected() -> Result<Cart, CartsServiceError> {
        let line = CartLine::new(
            CartLineId::new(3),
            ProductId::new(103),
            "Product 3",
            vnd(25_000),
            1,
            date(2025, 3, 2).at(9, 0, 0, 0),
        )?;

        Ok(Cart::with_lines(vec![line])?)
    }

    #[tokio::test]
    async fn test_decreasing_the_last_unit_sends_nothing() -> TestResult {
        let storefront = storefront(strict_carts(), strict_vouchers(), strict_orders(), MEMBER)?;

        assert_eq!(
            storefront.decrease_quantity(CartLineId::new(3)).await?,
            QuantityChange::RequestRemoval
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_cart_edits_stay_local() -> TestResult {
        let storefront = storefront(strict_carts(), strict_vouchers(), strict_orders(), Buyer::Guest)?;

        storefront.increase_quantity(CartLineId::new(1)).await?;

        let quantity = |id: i64| {
            storefront.with_session(|session| {
                session
                    .store()
                    .cart()
                    .line(CartLineId::new(id))
                    .map(CartLine::quantity)
            })
        };

        assert_eq!(quantity(1)?, Some(3));
        assert_eq!(storefront.summary()?.subtotal, vnd(600_000));

        assert_eq!(
            storefront.decrease_quantity(CartLineId::new(2)).await?,
            QuantityChange::NewQuantity(1)
        );
        assert_eq!(quantity(2)?, Some(1));

        storefront.remove_line(CartLineId::new(3)).await?;

        assert_eq!(quantity(3)?, None);

        storefront.toggle(CartLineId::new(2))?;
        storefront.delete_selected().await?;

        assert_eq!(
            storefront.with_session(|session| session.store().cart().len())?,
            1
        );
        assert_eq!(quantity(2)?, Some(1));

        storefront.select_all(true)?;
        storefront.delete_selected().await?;

        assert!(storefront.with_session(|session| session.store().cart().is_empty())?);

        Ok(())
    }

    #[tokio::test]
    async fn test_increasing_quantity_refetches() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_update_quantity()
            .once()
            .withf(|product, quantity| *product == ProductId::new(101) && *quantity == 3)
            .return_once(|_, _| Ok(()));

        carts.expect_get_cart().once().return_once(|| Ok(cart()?));
        carts.expect_remove_product().never();
        carts.expect_clear_cart().never();

        let storefront = storefront(carts, strict_vouchers(), strict_orders(), MEMBER)?;

        storefront.increase_quantity(CartLineId::new(1)).await?;

        Ok(())
    }
}
