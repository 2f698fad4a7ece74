//! Fixtures

use std::{fs, path::PathBuf, str::FromStr};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    catalog::{CatalogItem, ItemId},
    fixtures::menus::MenuFile,
};

pub mod menus;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between menu entries
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two entries share a key
    #[error("Duplicate menu key: {0}")]
    DuplicateKey(String),

    /// Menu item not found
    #[error("Menu item not found: {0}")]
    ItemNotFound(String),

    /// No menu loaded yet
    #[error("No menu loaded yet; currency unknown")]
    NoCurrency,
}

/// Menu fixture
#[derive(Debug)]
pub struct MenuFixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog items in menu order
    items: Vec<CatalogItem>,

    /// Menu key -> position in `items`
    keys: FxHashMap<String, usize>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl MenuFixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            items: Vec::new(),
            keys: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load `menus/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is malformed, a key repeats,
    /// or the currency differs from what is already loaded.
    pub fn load_menu(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("menus").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: MenuFile = serde_norway::from_str(&contents)?;

        for entry in fixture.items {
            let key = entry.key.clone();

            if self.keys.contains_key(&key) {
                return Err(FixtureError::DuplicateKey(key));
            }

            let (item, currency) = entry.into_catalog_item()?;

            match self.currency {
                Some(existing) if existing != currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(currency),
            }

            self.keys.insert(key, self.items.len());
            self.items.push(item);
        }

        Ok(self)
    }

    /// Load a named menu from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if the menu cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_menu(name)?;

        Ok(fixture)
    }

    /// Get an item by its menu key
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown.
    pub fn item(&self, key: &str) -> Result<&CatalogItem, FixtureError> {
        self.keys
            .get(key)
            .and_then(|&idx| self.items.get(idx))
            .ok_or_else(|| FixtureError::ItemNotFound(key.to_string()))
    }

    /// Get an item by menu key or by identifier
    ///
    /// # Errors
    ///
    /// Returns an error if neither matches.
    pub fn resolve(&self, key_or_id: &str) -> Result<&CatalogItem, FixtureError> {
        if let Ok(item) = self.item(key_or_id) {
            return Ok(item);
        }

        ItemId::from_str(key_or_id)
            .ok()
            .and_then(|id| self.items.iter().find(|item| item.id == id))
            .ok_or_else(|| FixtureError::ItemNotFound(key_or_id.to_string()))
    }

    /// Menu key of an item
    pub fn key_of(&self, id: ItemId) -> Option<&str> {
        self.keys.iter().find_map(|(key, &idx)| {
            self.items
                .get(idx)
                .filter(|item| item.id == id)
                .map(|_| key.as_str())
        })
    }

    /// All items in menu order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no menu has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for MenuFixture {
    fn default() -> Self {
        Self::new()
    }
}
