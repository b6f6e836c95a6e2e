//! Cart Fixtures

use jiff::civil::DateTime;
use serde::Deserialize;

use crate::{
    cart::{Cart, CartLine},
    checkout::session::CheckoutSession,
    fixtures::FixtureError,
    ids::{CartLineId, ProductId},
    money,
};

/// Cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in backend order
    pub lines: Vec<CartLineFixture>,

    /// Ids of the lines ticked for checkout
    #[serde(default)]
    pub selected: Vec<CartLineId>,
}

/// Cart line in YAML
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Line id
    pub id: CartLineId,

    /// Product id
    pub product_id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price in đồng
    pub unit_price: i64,

    /// Units
    pub quantity: u32,

    /// When the line was added
    pub added_at: DateTime,
}

/// A loaded cart with its selection
#[derive(Debug, Clone)]
pub struct CartSet {
    /// The cart
    pub cart: Cart,

    /// Selected line ids
    pub selected: Vec<CartLineId>,
}

impl CartSet {
    /// Start a checkout session with the fixture's selection ticked.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::UnknownLine`] if a selected id is not in the
    /// cart, or a pricing error if the subtotal overflows.
    pub fn into_session(self) -> Result<CheckoutSession, FixtureError> {
        if let Some(missing) = self
            .selected
            .iter()
            .find(|id| !self.cart.contains(**id))
        {
            return Err(FixtureError::UnknownLine(*missing));
        }

        let mut session = CheckoutSession::new(self.cart);

        for id in self.selected {
            if !session.store().selection().contains(id) {
                session.toggle(id)?;
            }
        }

        Ok(session)
    }
}

impl TryFrom<CartFixture> for CartSet {
    type Error = FixtureError;

    fn try_from(fixture: CartFixture) -> Result<Self, Self::Error> {
        let lines = fixture
            .lines
            .into_iter()
            .map(|line| {
                CartLine::new(
                    line.id,
                    line.product_id,
                    line.name,
                    money::vnd(line.unit_price),
                    line.quantity,
                    line.added_at,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cart: Cart::with_lines(lines)?,
            selected: fixture.selected,
        })
    }
}
