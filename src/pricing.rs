//! Pricing
//!
//! Derived cart totals and the numeric normalisation applied to data entering the cart from
//! outside (persisted snapshots, catalog prices).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde_json::Value;

/// Sales tax applied to every cart subtotal (6%).
pub const TAX_RATE: Decimal = Decimal::from_parts(6, 0, 0, false, 2);

/// Subtotal, tax and total of a set of priced lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of unit price times quantity over every line
    pub subtotal: Decimal,

    /// `subtotal * TAX_RATE`, rounded to the currency's minor unit
    pub tax_amount: Decimal,

    /// `subtotal + tax_amount`
    pub total: Decimal,
}

impl Totals {
    /// Compute totals for `(unit price, quantity)` pairs priced in `currency`.
    pub fn from_lines(
        lines: impl IntoIterator<Item = (Decimal, u32)>,
        currency: &Currency,
    ) -> Self {
        let subtotal = lines
            .into_iter()
            .fold(Decimal::ZERO, |acc, (price, quantity)| {
                acc.saturating_add(line_total(price, quantity))
            });

        let tax_amount = round_to_currency(subtotal.saturating_mul(TAX_RATE), currency);

        Self {
            subtotal,
            tax_amount,
            total: subtotal.saturating_add(tax_amount),
        }
    }

    /// The subtotal as money.
    pub fn subtotal_money<'a>(&self, currency: &'a Currency) -> Money<'a, Currency> {
        Money::from_decimal(self.subtotal, currency)
    }

    /// The tax amount as money.
    pub fn tax_money<'a>(&self, currency: &'a Currency) -> Money<'a, Currency> {
        Money::from_decimal(self.tax_amount, currency)
    }

    /// The total as money.
    pub fn total_money<'a>(&self, currency: &'a Currency) -> Money<'a, Currency> {
        Money::from_decimal(self.total, currency)
    }
}

/// Price of `quantity` units.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price.saturating_mul(Decimal::from(quantity))
}

/// Round an amount to the minor unit of `currency`, half away from zero.
pub fn round_to_currency(amount: Decimal, currency: &Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
}

/// Coerce an externally supplied quantity into a whole number of units.
///
/// Anything that is not a finite, non-negative number (or a string holding one) becomes `0`.
/// Fractions are truncated and values beyond `u32::MAX` saturate.
pub fn normalize_quantity(value: &Value) -> u32 {
    parse_decimal(value)
        .filter(|quantity| quantity.is_sign_positive())
        .map(|quantity| quantity.trunc().min(Decimal::from(u32::MAX)))
        .and_then(|quantity| quantity.to_u32())
        .unwrap_or(0)
}

/// Coerce an externally supplied unit price into a non-negative decimal, defaulting to zero.
pub fn normalize_price(value: &Value) -> Decimal {
    parse_decimal(value)
        .filter(|price| price.is_sign_positive())
        .unwrap_or(Decimal::ZERO)
}

/// Clamp a catalog price to be non-negative.
pub fn non_negative(price: Decimal) -> Decimal {
    price.max(Decimal::ZERO)
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(Decimal::from)
            .or_else(|| number.as_i64().map(Decimal::from))
            .or_else(|| number.as_f64().and_then(Decimal::from_f64_retain)),
        Value::String(text) => {
            let text = text.trim();

            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .ok()
        }
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use serde_json::json;

    use super::*;

    #[test]
    fn totals_apply_six_percent_tax() {
        let totals = Totals::from_lines([(Decimal::from(500), 2)], iso::USD);

        assert_eq!(totals.subtotal, Decimal::from(1000));
        assert_eq!(totals.tax_amount, Decimal::from(60));
        assert_eq!(totals.total, Decimal::from(1060));
    }

    #[test]
    fn tax_rounds_half_away_from_zero_to_minor_units() {
        // 0.25 * 0.06 = 0.015
        let totals = Totals::from_lines([(Decimal::new(25, 2), 1)], iso::USD);

        assert_eq!(totals.tax_amount, Decimal::new(2, 2));
        assert_eq!(totals.total, Decimal::new(27, 2));
    }

    #[test]
    fn totals_of_nothing_are_zero() {
        let totals = Totals::from_lines([], iso::GBP);

        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn money_accessors_use_the_given_currency() {
        let totals = Totals::from_lines([(Decimal::new(1050, 2), 2)], iso::GBP);

        assert_eq!(
            totals.subtotal_money(iso::GBP),
            Money::from_decimal(Decimal::new(2100, 2), iso::GBP)
        );
        assert_eq!(totals.total_money(iso::GBP).currency(), iso::GBP);
    }

    #[test]
    fn normalize_quantity_accepts_numbers_and_numeric_strings() {
        assert_eq!(normalize_quantity(&json!(3)), 3);
        assert_eq!(normalize_quantity(&json!(2.9)), 2);
        assert_eq!(normalize_quantity(&json!(" 4 ")), 4);
        assert_eq!(normalize_quantity(&json!("1e1")), 10);
    }

    #[test]
    fn normalize_quantity_defaults_to_zero() {
        assert_eq!(normalize_quantity(&json!("many")), 0);
        assert_eq!(normalize_quantity(&json!("NaN")), 0);
        assert_eq!(normalize_quantity(&json!(null)), 0);
        assert_eq!(normalize_quantity(&json!(true)), 0);
        assert_eq!(normalize_quantity(&json!(-2)), 0);
        assert_eq!(normalize_quantity(&json!([1])), 0);
    }

    #[test]
    fn normalize_quantity_saturates() {
        assert_eq!(normalize_quantity(&json!(u64::MAX)), u32::MAX);
    }

    #[test]
    fn normalize_price_defaults_to_zero() {
        assert_eq!(normalize_price(&json!("12.50")), Decimal::new(1250, 2));
        assert_eq!(normalize_price(&json!(7)), Decimal::from(7));
        assert_eq!(normalize_price(&json!("free")), Decimal::ZERO);
        assert_eq!(normalize_price(&json!(-1)), Decimal::ZERO);
    }
}
