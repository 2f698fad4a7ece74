//! Cart snapshot encoding.
//!
//! Snapshots are written with typed fields but read back leniently: prices and quantities pass
//! through the pricing normalisers so a hand-edited or legacy snapshot degrades line by line
//! instead of failing as a whole.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::ItemId,
    pricing::{normalize_price, normalize_quantity},
};

#[derive(Debug, Serialize)]
struct StoredCart<'a> {
    currency: &'static str,
    lines: Vec<StoredLine<'a>>,
}

#[derive(Debug, Serialize)]
struct StoredLine<'a> {
    item_id: ItemId,
    name: &'a str,
    unit_price: Decimal,
    quantity: u32,
    is_available: bool,
}

#[derive(Debug, Deserialize)]
struct RawCart {
    #[serde(default)]
    currency: Option<String>,

    #[serde(default)]
    lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    item_id: ItemId,

    #[serde(default)]
    name: String,

    #[serde(default)]
    unit_price: Value,

    #[serde(default)]
    quantity: Value,

    #[serde(default = "available")]
    is_available: bool,
}

const fn available() -> bool {
    true
}

/// Serialize the cart into its snapshot form.
pub(super) fn encode(cart: &Cart) -> Result<String, CartError> {
    let stored = StoredCart {
        currency: cart.currency().iso_alpha_code,
        lines: cart
            .lines()
            .iter()
            .map(|line| StoredLine {
                item_id: line.item_id,
                name: &line.name,
                unit_price: line.unit_price,
                quantity: line.quantity,
                is_available: line.is_available,
            })
            .collect(),
    };

    serde_json::to_string(&stored)
        .map_err(|error| CartError::CorruptPersistedState(error.to_string()))
}

/// Decode a snapshot for a session priced in `currency`.
///
/// Lines whose quantity normalises to zero are dropped and repeated item ids are merged, so the
/// returned cart always satisfies the one-line-per-item, quantity-at-least-one invariants.
pub(super) fn decode(raw: &str, currency: &'static Currency) -> Result<Cart, CartError> {
    let snapshot: RawCart = serde_json::from_str(raw)
        .map_err(|error| CartError::CorruptPersistedState(error.to_string()))?;

    if let Some(code) = snapshot.currency.as_deref() {
        let stored = iso::find(code).ok_or_else(|| {
            CartError::CorruptPersistedState(format!("unknown currency {code}"))
        })?;

        if stored != currency {
            return Err(CartError::CorruptPersistedState(format!(
                "snapshot priced in {}, session uses {}",
                stored.iso_alpha_code, currency.iso_alpha_code
            )));
        }
    }

    let mut lines: Vec<CartLine> = Vec::with_capacity(snapshot.lines.len());
    let mut positions: FxHashMap<ItemId, usize> = FxHashMap::default();

    for raw in snapshot.lines {
        let quantity = normalize_quantity(&raw.quantity);

        if quantity == 0 {
            debug!(item_id = %raw.item_id, "dropping cart line with unusable quantity");
            continue;
        }

        if let Some(line) = positions
            .get(&raw.item_id)
            .and_then(|&index| lines.get_mut(index))
        {
            line.quantity = line.quantity.saturating_add(quantity);
            continue;
        }

        positions.insert(raw.item_id, lines.len());

        lines.push(CartLine {
            item_id: raw.item_id,
            name: raw.name,
            unit_price: normalize_price(&raw.unit_price),
            quantity,
            is_available: raw.is_available,
        });
    }

    Ok(Cart::with_lines(lines, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use serde_json::json;
    use testresult::TestResult;

    use crate::catalog::CatalogItem;

    use super::*;

    const DAL: &str = "0191f6b4-7c4e-7a3c-9a55-3c2b1f1e0d01";
    const NAAN: &str = "0191f6b4-7c4e-7a3c-9a55-3c2b1f1e0d02";

    #[test]
    fn encode_then_decode_preserves_lines() -> TestResult {
        let mut cart = Cart::new(iso::USD);

        cart.merge(
            &CatalogItem::new(DAL.parse()?, "Dal", Decimal::new(1250, 2)),
            2,
        );

        let decoded = decode(&encode(&cart)?, iso::USD)?;

        assert_eq!(decoded, cart);

        Ok(())
    }

    #[test]
    fn non_numeric_quantities_are_dropped() -> TestResult {
        let raw = json!({
            "currency": "USD",
            "lines": [
                { "item_id": DAL, "name": "Dal", "unit_price": "5", "quantity": "lots" },
                { "item_id": NAAN, "name": "Naan", "unit_price": 2, "quantity": null },
            ]
        })
        .to_string();

        let cart = decode(&raw, iso::USD)?;

        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);

        Ok(())
    }

    #[test]
    fn duplicate_ids_are_merged() -> TestResult {
        let raw = json!({
            "lines": [
                { "item_id": DAL, "name": "Dal", "unit_price": "5", "quantity": 1 },
                { "item_id": NAAN, "name": "Naan", "unit_price": "2", "quantity": 1 },
                { "item_id": DAL, "name": "Dal", "unit_price": "5", "quantity": "2" },
            ]
        })
        .to_string();

        let cart = decode(&raw, iso::USD)?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.line(DAL.parse()?).map(|line| line.quantity), Some(3));

        Ok(())
    }

    #[test]
    fn unparseable_prices_default_to_zero() -> TestResult {
        let raw = json!({
            "lines": [{ "item_id": DAL, "unit_price": "call us", "quantity": 2 }]
        })
        .to_string();

        let cart = decode(&raw, iso::USD)?;

        assert_eq!(cart.totals().subtotal, Decimal::ZERO);
        assert_eq!(cart.total_items(), 2);

        Ok(())
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(
            decode("{not json", iso::USD),
            Err(CartError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn currency_mismatch_is_corrupt() {
        let raw = json!({ "currency": "GBP", "lines": [] }).to_string();

        assert!(matches!(
            decode(&raw, iso::USD),
            Err(CartError::CorruptPersistedState(_))
        ));
    }
}
