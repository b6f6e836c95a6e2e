//! Petlor prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, CartLine,
        quantity::{QuantityChange, decrease_quantity, increase_quantity},
        selection::{CartStore, RefreshTicket, RemovalPlan, SelectionSet, SelectionStats},
    },
    checkout::{
        CheckoutError,
        dispatch::{
            Buyer, CheckoutStage, CreationRoute, DraftLine, OrderDraft, ShippingDetails,
            ShippingField, prepare_order,
        },
        payment::{PaymentMethod, QrPayment, order_reference},
        session::{CheckoutHandOff, CheckoutSession, CheckoutSummary},
        total::{SHIPPING_FEE_VND, shipping_fee, total},
    },
    fixtures::{Fixture, FixtureError},
    ids::{CartLineId, OrderId, ProductId, UserId},
    money::{Amount, PricingError, vnd},
    orders::{
        Order, OrderLine, OrderRecord,
        page::{ListEnvelope, OrderQuery, Page, SortOrder},
        stats::OrderStats,
        status::{OrderStatus, StatusError, StatusVocabulary},
        transitions::{
            BulkPlan, BulkReport, BulkSelection, QuickAction, StatusUpdate, TransitionError,
            UpdatePath, admin_set_status, plan_bulk, quick_action, quick_advance,
        },
    },
    receipt::ReceiptError,
    vouchers::{
        DiscountKind, Voucher, VoucherCode, VoucherError,
        engine::{AppliedDiscount, ValidationOutcome, ValidationTicket, VoucherEngine},
    },
};
