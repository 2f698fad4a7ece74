//! Menu Fixtures

use std::str::FromStr;

use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;

use crate::{
    catalog::{CatalogItem, ItemId},
    fixtures::FixtureError,
};

/// Menu fixture file
#[derive(Debug, Deserialize)]
pub struct MenuFile {
    /// Menu entries, in display order
    pub items: Vec<MenuEntry>,
}

/// A single menu entry
#[derive(Debug, Deserialize)]
pub struct MenuEntry {
    /// Short lookup key, e.g. `samosa`
    pub key: String,

    /// Stable catalog identifier
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Price with currency, e.g. `4.50 USD`
    pub price: String,

    /// Whether the kitchen is taking orders for it
    #[serde(default = "available")]
    pub available: bool,
}

fn available() -> bool {
    true
}

impl MenuEntry {
    /// Convert into a catalog item, returning its currency alongside.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn into_catalog_item(self) -> Result<(CatalogItem, &'static Currency), FixtureError> {
        let (price, currency) = parse_price(&self.price)?;

        let item = CatalogItem {
            id: self.id,
            name: self.name,
            price,
            is_available: self.available,
        };

        Ok((item, currency))
    }
}

/// Parse a price string such as `12.50 USD` into an amount and its currency.
///
/// # Errors
///
/// - [`FixtureError::InvalidPrice`]: the string is not `<amount> <code>` or the amount is negative.
/// - [`FixtureError::UnknownCurrency`]: the code is not an ISO 4217 currency.
pub fn parse_price(price: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let mut parts = price.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(price.to_string()));
    };

    let amount =
        Decimal::from_str(amount).map_err(|_err| FixtureError::InvalidPrice(price.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(price.to_string()));
    }

    let currency = iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    Ok((amount, currency))
}
