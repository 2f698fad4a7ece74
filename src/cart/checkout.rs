//! Checkout hand-off to the order-creation service.

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    backend::{BackendError, OrderCreation},
    cart::{CartSlot, CartStore},
    orders::{CreatedOrder, DeliveryDetails, NewOrder, OrderLine, PaymentMethod},
};

/// Checkout failures. The cart is left untouched in every case.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The order service failed; the customer may retry.
    #[error("order could not be placed")]
    Backend(#[source] BackendError),
}

/// What the customer supplies at checkout besides the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    /// Payment method tag
    pub payment_method: PaymentMethod,

    /// Where to deliver
    pub delivery: DeliveryDetails,
}

impl<S: CartSlot> CartStore<S> {
    /// Build an order from the cart and submit it. The cart is cleared once the order exists.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::Backend`]: the order service failed; the cart is unchanged.
    pub async fn checkout(
        &mut self,
        service: &dyn OrderCreation,
        details: CheckoutDetails,
    ) -> Result<CreatedOrder, CheckoutError> {
        let cart = self.cart();

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let totals = cart.totals();

        let order = NewOrder {
            lines: cart
                .lines()
                .iter()
                .map(|line| OrderLine {
                    item_id: line.item_id,
                    name: line.name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                })
                .collect(),
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total: totals.total,
            currency: cart.currency(),
            payment_method: details.payment_method,
            delivery: details.delivery,
        };

        let created = service
            .create_order(order)
            .await
            .map_err(CheckoutError::Backend)?;

        info!(order_id = %created.id, "checked out cart");

        if let Err(error) = self.clear_cart() {
            warn!(%error, order_id = %created.id, "order placed but cart snapshot was not cleared");
        }

        Ok(created)
    }
}
