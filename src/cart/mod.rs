//! Cart
//!
//! The customer's shopping cart: an insertion-ordered set of lines, one per catalog item, with
//! subtotal, tax and total always derived from the lines.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    backend::BackendError,
    catalog::{CatalogItem, ItemId},
    pricing::{Totals, line_total, non_negative},
};

mod checkout;
pub mod slot;
mod snapshot;
mod store;

pub use checkout::{CheckoutDetails, CheckoutError};
pub use slot::{CART_KEY, CartSlot, FileSlot, MemorySlot, SlotError};
pub use store::{CartStore, LoadOutcome};

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The item was flagged unavailable when it was added; the cart is unchanged.
    #[error("{name} is currently unavailable")]
    Unavailable {
        /// Item that was rejected
        item_id: ItemId,
        /// Display name for the notice
        name: String,
    },

    /// An add was requested with a quantity of zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// The stored snapshot could not be decoded; the cart was reset.
    #[error("persisted cart is corrupt: {0}")]
    CorruptPersistedState(String),

    /// The cart changed in memory but the snapshot could not be written.
    #[error("failed to persist cart")]
    Persist(#[from] SlotError),

    /// The catalog could not be queried.
    #[error("catalog lookup failed")]
    Backend(#[source] BackendError),
}

/// One item-quantity pair in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Catalog identifier
    pub item_id: ItemId,

    /// Display name
    pub name: String,

    /// Non-negative price of a single unit
    pub unit_price: Decimal,

    /// Number of units, always at least 1
    pub quantity: u32,

    /// Availability when the line was first added
    pub is_available: bool,
}

impl CartLine {
    /// Build a line for `quantity` units of a catalog item.
    pub fn from_catalog(item: &CatalogItem, quantity: u32) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            unit_price: non_negative(item.price),
            quantity,
            is_available: item.is_available,
        }
    }

    /// Price of the whole line.
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// Cart contents and their derived totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    pub(crate) fn with_lines(lines: Vec<CartLine>, currency: &'static Currency) -> Self {
        Self { lines, currency }
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for an item.
    pub fn line(&self, item_id: ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item_id == item_id)
    }

    /// Get the number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of all line quantities.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Recompute subtotal, tax and total from the current lines.
    pub fn totals(&self) -> Totals {
        Totals::from_lines(
            self.lines
                .iter()
                .map(|line| (line.unit_price, line.quantity)),
            self.currency,
        )
    }

    /// Sum of unit price times quantity.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.totals().subtotal_money(self.currency)
    }

    /// Tax on the subtotal.
    pub fn tax_amount(&self) -> Money<'static, Currency> {
        self.totals().tax_money(self.currency)
    }

    /// Subtotal plus tax.
    pub fn total(&self) -> Money<'static, Currency> {
        self.totals().total_money(self.currency)
    }

    /// Merge `quantity` units of `item` into the cart.
    pub(crate) fn merge(&mut self, item: &CatalogItem, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item_id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine::from_catalog(item, quantity));
        }
    }

    /// Remove the line for an item, returning whether one was present.
    pub(crate) fn remove(&mut self, item_id: ItemId) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.item_id != item_id);

        self.lines.len() != before
    }

    /// Overwrite the quantity of an existing line, returning whether one was present.
    pub(crate) fn set_quantity(&mut self, item_id: ItemId, quantity: u32) -> bool {
        match self.lines.iter_mut().find(|line| line.item_id == item_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }
}
