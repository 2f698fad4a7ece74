//! Cart Store

use rusty_money::{Money, iso::Currency};
use tracing::{debug, info, warn};

use crate::{
    cart::{
        Cart, CartError,
        slot::{CART_KEY, CartSlot, SlotError},
        snapshot,
    },
    catalog::{Catalog, CatalogItem, ItemId},
    pricing::Totals,
};

/// How the store's contents were obtained when it was opened.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No snapshot was stored; the cart starts empty.
    Empty,

    /// The stored snapshot was loaded.
    Restored,

    /// The stored snapshot could not be used and was replaced with an empty cart.
    Discarded(CartError),

    /// The slot could not be read. The cart starts empty but the stored snapshot is left in
    /// place until the cart is next changed.
    Unreadable(SlotError),
}

/// Owns the session cart and keeps its snapshot in a [`CartSlot`] up to date.
#[derive(Debug)]
pub struct CartStore<S: CartSlot> {
    cart: Cart,
    slot: S,
    load: LoadOutcome,
}

impl<S: CartSlot> CartStore<S> {
    /// Open the store, loading any snapshot held in `slot`.
    ///
    /// Opening never fails. A snapshot that cannot be decoded is overwritten with an empty cart
    /// and reported as [`LoadOutcome::Discarded`]. A slot that cannot be read is reported as
    /// [`LoadOutcome::Unreadable`] and not written to.
    pub fn open(slot: S, currency: &'static Currency) -> Self {
        let mut store = Self {
            cart: Cart::new(currency),
            slot,
            load: LoadOutcome::Empty,
        };

        let raw = match store.slot.read(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return store,
            Err(error) => {
                warn!(%error, "cart snapshot unreadable, starting empty");

                store.load = LoadOutcome::Unreadable(error);

                return store;
            }
        };

        match snapshot::decode(&raw, currency) {
            Ok(cart) => {
                debug!(lines = cart.len(), "restored cart snapshot");

                store.cart = cart;
                store.load = LoadOutcome::Restored;
            }
            Err(error) => {
                warn!(%error, "discarding unusable cart snapshot");

                if let Err(persist) = store.persist() {
                    warn!(error = %persist, "failed to reset cart snapshot");
                }

                store.load = LoadOutcome::Discarded(error);
            }
        }

        store
    }

    /// How the cart was obtained when the store was opened.
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load
    }

    /// Current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The underlying slot.
    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Add `quantity` units of `item`, merging into an existing line for the same item.
    ///
    /// # Errors
    ///
    /// - [`CartError::Unavailable`]: the item is flagged unavailable; the cart is unchanged.
    /// - [`CartError::ZeroQuantity`]: `quantity` is zero; the cart is unchanged.
    /// - [`CartError::Persist`]: the cart changed but the snapshot could not be written.
    pub fn add_item(&mut self, item: &CatalogItem, quantity: u32) -> Result<(), CartError> {
        if !item.is_available {
            info!(item_id = %item.id, "rejected add of unavailable item");

            return Err(CartError::Unavailable {
                item_id: item.id,
                name: item.name.clone(),
            });
        }

        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        self.cart.merge(item, quantity);

        debug!(item_id = %item.id, quantity, "added item to cart");

        self.persist()
    }

    /// Fetch `item_id` from the catalog and add it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Backend`] if the catalog lookup fails, otherwise the errors of
    /// [`CartStore::add_item`].
    pub async fn add_from_catalog(
        &mut self,
        catalog: &dyn Catalog,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), CartError> {
        let item = catalog
            .catalog_item(item_id)
            .await
            .map_err(CartError::Backend)?;

        self.add_item(&item, quantity)
    }

    /// Remove the line for `item_id`. Removing an absent item is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persist`] if the snapshot could not be written.
    pub fn remove_item(&mut self, item_id: ItemId) -> Result<(), CartError> {
        if self.cart.remove(item_id) {
            debug!(%item_id, "removed item from cart");
        }

        self.persist()
    }

    /// Set the quantity of an existing line. Quantities of zero or less remove the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persist`] if the snapshot could not be written.
    pub fn update_quantity(&mut self, item_id: ItemId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_item(item_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if self.cart.set_quantity(item_id, quantity) {
            debug!(%item_id, quantity, "updated cart quantity");
        }

        self.persist()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persist`] if the empty snapshot could not be written.
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.cart.clear();

        debug!("cleared cart");

        self.persist()
    }

    /// Sum of all line quantities.
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Derived totals of the current lines.
    pub fn totals(&self) -> Totals {
        self.cart.totals()
    }

    /// Sum of unit price times quantity.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.cart.subtotal()
    }

    /// Tax on the subtotal.
    pub fn tax_amount(&self) -> Money<'static, Currency> {
        self.cart.tax_amount()
    }

    /// Subtotal plus tax.
    pub fn total(&self) -> Money<'static, Currency> {
        self.cart.total()
    }

    pub(super) fn persist(&mut self) -> Result<(), CartError> {
        let snapshot = snapshot::encode(&self.cart)?;

        self.slot.write(CART_KEY, &snapshot)?;

        Ok(())
    }
}
