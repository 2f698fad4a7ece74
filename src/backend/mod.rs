//! Backend collaborators
//!
//! Contracts for the services of record that own orders, deliveries and the catalog. Transport
//! and serialization are up to the implementation.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    orders::{CreatedOrder, DriverId, NewOrder, OrderFilter, OrderId, OrderRecord},
    status::LifecycleStatus,
};

mod memory;

pub use memory::MemoryBackend;

/// Failures reported by a backend collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service could not be reached or failed internally.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// No record exists with the requested identifier.
    #[error("record not found")]
    NotFound,

    /// The service refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// A status change submitted to the mutation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Target status
    pub status: LifecycleStatus,

    /// Cash the driver confirmed collecting, for cash-on-delivery completion
    pub cash_collected: Option<Decimal>,
}

/// Persists new orders.
#[automock]
#[async_trait]
pub trait OrderCreation: Send + Sync {
    /// Create an order from a checked-out cart; the order starts `Pending`.
    async fn create_order(&self, order: NewOrder) -> Result<CreatedOrder, BackendError>;
}

/// Reads orders and their deliveries.
#[automock]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Retrieve a single order.
    async fn get_order(&self, id: OrderId) -> Result<OrderRecord, BackendError>;

    /// List the orders matching `filter`, newest first.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderRecord>, BackendError>;
}

/// Performs authoritative state changes.
#[automock]
#[async_trait]
pub trait OrderMutation: Send + Sync {
    /// Move an order or its delivery to a new status.
    async fn set_status(&self, id: OrderId, update: StatusUpdate) -> Result<(), BackendError>;

    /// Set or clear the driver assigned to an order's delivery.
    async fn assign_driver(
        &self,
        id: OrderId,
        driver: Option<DriverId>,
    ) -> Result<(), BackendError>;
}
