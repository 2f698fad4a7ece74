//! Catalog

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;

use crate::{backend::BackendError, uuids::TypedUuid};

/// Catalog item identifier.
pub type ItemId = TypedUuid<CatalogItem>;

/// A menu entry as reported by the catalog collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// Stable identifier
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Unit price in the catalog currency
    pub price: Decimal,

    /// Whether the kitchen currently accepts orders for this item
    pub is_available: bool,
}

impl CatalogItem {
    /// Create an available catalog item.
    pub fn new(id: ItemId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            is_available: true,
        }
    }

    /// Mark the item as unavailable.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }
}

/// Supplies prices and availability for the cart's add-time checks.
#[automock]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a single catalog entry.
    async fn catalog_item(&self, id: ItemId) -> Result<CatalogItem, BackendError>;

    /// List every entry on the menu.
    async fn menu(&self) -> Result<Vec<CatalogItem>, BackendError>;
}
