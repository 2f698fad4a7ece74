//! In-memory backend of record.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    backend::{BackendError, OrderCreation, OrderMutation, OrderQuery, StatusUpdate},
    catalog::{Catalog, CatalogItem, ItemId},
    orders::{
        CreatedOrder, DeliveryRecord, DriverId, NewOrder, OrderFilter, OrderId, OrderRecord,
    },
    status::{DeliveryStatus, LifecycleStatus, OrderStatus, Status},
};

#[derive(Debug, Default)]
struct State {
    orders: FxHashMap<OrderId, OrderRecord>,
    /// Delivery status each assigned order had before its driver was set
    unassigned: FxHashMap<OrderId, DeliveryStatus>,
    menu: Vec<CatalogItem>,
    offline: bool,
}

impl State {
    fn ensure_online(&self) -> Result<(), BackendError> {
        if self.offline {
            Err(BackendError::Unavailable("backend is offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn order_mut(&mut self, id: OrderId) -> Result<&mut OrderRecord, BackendError> {
        self.orders.get_mut(&id).ok_or(BackendError::NotFound)
    }
}

/// A backend that keeps orders and the menu in process memory.
///
/// Clones share the same state, so one instance can serve the customer, admin and driver sides
/// of a session. It re-validates every transition itself and applies the follow-on changes a
/// real order service would:
///
/// - a delivered order completes
/// - cancelling an order cancels its delivery
/// - setting a driver marks the delivery assigned, and clearing it restores the status the
///   delivery had before
/// - collected cash is recorded for cash-on-delivery orders only
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    delivery_fee: Decimal,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

impl MemoryBackend {
    /// Create an empty backend charging `delivery_fee` on every order.
    pub fn new(delivery_fee: Decimal) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            delivery_fee,
        }
    }

    /// Replace the menu.
    pub async fn set_menu(&self, menu: impl IntoIterator<Item = CatalogItem>) {
        self.state.lock().await.menu = menu.into_iter().collect();
    }

    /// Flag a menu item as available or not.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the item is not on the menu.
    pub async fn set_available(&self, id: ItemId, available: bool) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;

        let item = state
            .menu
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(BackendError::NotFound)?;

        item.is_available = available;

        Ok(())
    }

    /// Simulate an outage: while offline every call fails with [`BackendError::Unavailable`].
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Store a record as-is, replacing any record with the same id.
    pub async fn insert_order(&self, record: OrderRecord) {
        self.state.lock().await.orders.insert(record.id, record);
    }
}

#[async_trait]
impl Catalog for MemoryBackend {
    async fn catalog_item(&self, id: ItemId) -> Result<CatalogItem, BackendError> {
        let state = self.state.lock().await;

        state.ensure_online()?;

        state
            .menu
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn menu(&self) -> Result<Vec<CatalogItem>, BackendError> {
        let state = self.state.lock().await;

        state.ensure_online()?;

        Ok(state.menu.clone())
    }
}

#[async_trait]
impl OrderCreation for MemoryBackend {
    async fn create_order(&self, order: NewOrder) -> Result<CreatedOrder, BackendError> {
        let mut state = self.state.lock().await;

        state.ensure_online()?;

        if order.lines.is_empty() {
            return Err(BackendError::Rejected("order has no lines".to_string()));
        }

        let id = OrderId::now_v7();

        let record = OrderRecord {
            id,
            created_at: Timestamp::now(),
            details: order.delivery,
            lines: order.lines,
            subtotal: order.subtotal,
            tax_amount: order.tax_amount,
            delivery_fee: self.delivery_fee,
            total: order.total.saturating_add(self.delivery_fee),
            currency: order.currency,
            payment_method: order.payment_method,
            status: OrderStatus::INITIAL,
            delivery: DeliveryRecord::pending(),
        };

        info!(order_id = %id, total = %record.total, "order created");

        state.orders.insert(id, record);

        Ok(CreatedOrder {
            id,
            status: OrderStatus::INITIAL,
        })
    }
}

#[async_trait]
impl OrderQuery for MemoryBackend {
    async fn get_order(&self, id: OrderId) -> Result<OrderRecord, BackendError> {
        let state = self.state.lock().await;

        state.ensure_online()?;

        state.orders.get(&id).cloned().ok_or(BackendError::NotFound)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderRecord>, BackendError> {
        let state = self.state.lock().await;

        state.ensure_online()?;

        let mut orders: Vec<OrderRecord> = state
            .orders
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(orders)
    }
}

#[async_trait]
impl OrderMutation for MemoryBackend {
    async fn set_status(&self, id: OrderId, update: StatusUpdate) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;

        state.ensure_online()?;

        let record = state.order_mut(id)?;

        record
            .check_transition(update.status)
            .map_err(|rejection| BackendError::Rejected(rejection.to_string()))?;

        match update.status {
            LifecycleStatus::Order(status) => {
                record.status = status;

                if status == OrderStatus::Cancelled && !record.delivery.status.is_terminal() {
                    record.delivery.status = DeliveryStatus::Cancelled;
                }
            }
            LifecycleStatus::Delivery(status) => {
                record.delivery.status = status;

                if status == DeliveryStatus::Delivered {
                    if record.is_cash_on_delivery() {
                        record.delivery.cash_collected = update.cash_collected;
                    }

                    if record.status == OrderStatus::Ready {
                        record.status = OrderStatus::Completed;
                    }
                }
            }
        }

        debug!(order_id = %id, status = %update.status, "status updated");

        Ok(())
    }

    async fn assign_driver(
        &self,
        id: OrderId,
        driver: Option<DriverId>,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;

        state.ensure_online()?;

        let State {
            orders, unassigned, ..
        } = &mut *state;

        let record = orders.get_mut(&id).ok_or(BackendError::NotFound)?;

        if !record.delivery.status.is_pre_pickup() {
            return Err(BackendError::Rejected(format!(
                "delivery is already {}",
                record.delivery.status
            )));
        }

        record.delivery.driver = driver;

        match (driver, record.delivery.status) {
            (Some(_), previous @ (DeliveryStatus::Pending | DeliveryStatus::ReadyForPickup)) => {
                unassigned.insert(id, previous);
                record.delivery.status = DeliveryStatus::Assigned;
            }
            (None, DeliveryStatus::Assigned) => {
                record.delivery.status =
                    unassigned.remove(&id).unwrap_or(DeliveryStatus::INITIAL);
            }
            _ => {}
        }

        debug!(order_id = %id, driver = ?driver, "driver assignment updated");

        Ok(())
    }
}
