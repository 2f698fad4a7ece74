//! Tiffin prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    backend::{
        BackendError, MemoryBackend, OrderCreation, OrderMutation, OrderQuery, StatusUpdate,
    },
    cart::{
        CART_KEY, Cart, CartError, CartLine, CartSlot, CartStore, CheckoutDetails, CheckoutError,
        FileSlot, LoadOutcome, MemorySlot, SlotError,
    },
    catalog::{Catalog, CatalogItem, ItemId},
    fixtures::{FixtureError, MenuFixture},
    lifecycle::{LifecycleController, LifecycleError, TransitionContext},
    orders::{
        CreatedOrder, DeliveryDetails, DeliveryRecord, DriverId, NewOrder, OrderFilter, OrderId,
        OrderLine, OrderRecord, PaymentMethod,
    },
    pricing::{TAX_RATE, Totals},
    receipt::{Receipt, ReceiptError},
    status::{
        DeliveryStatus, InvalidTransition, LifecycleStatus, OrderStatus, Status, StatusTone,
        TransitionGraph, check_lifecycle, check_transition,
    },
    views::{Action, AdminTable, DriverDashboard, Role, ViewError, available_actions},
};
