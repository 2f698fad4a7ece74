//! Receipt

use std::{fmt::Write as _, io};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{TAX_RATE, Totals},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The output could not be written.
    #[error("failed to write receipt")]
    Io(#[source] io::Error),
}

/// A printable summary of a cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    cart: &'a Cart,
    totals: Totals,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for the current contents of `cart`.
    #[must_use]
    pub fn new(cart: &'a Cart) -> Self {
        Self {
            cart,
            totals: cart.totals(),
        }
    }

    /// Sum of the lines
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.totals.subtotal_money(self.cart.currency())
    }

    /// Tax on the subtotal
    #[must_use]
    pub fn tax(&self) -> Money<'static, Currency> {
        self.totals.tax_money(self.cart.currency())
    }

    /// Amount due
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        self.totals.total_money(self.cart.currency())
    }

    /// Render the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] if `out` cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.cart.is_empty() {
            return writeln!(out, "\nYour cart is empty.\n").map_err(ReceiptError::Io);
        }

        let currency = self.cart.currency();
        let mut builder = Builder::default();
        let mut unavailable_rows: SmallVec<[usize; 8]> = SmallVec::new();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Line Total"]);

        for (idx, line) in self.cart.lines().iter().enumerate() {
            let name = if line.is_available {
                line.name.clone()
            } else {
                unavailable_rows.push(idx + 1);
                format!("{} (unavailable)", line.name)
            };

            builder.push_record([
                format!("#{}", idx + 1),
                name,
                line.quantity.to_string(),
                Money::from_decimal(line.unit_price, currency).to_string(),
                Money::from_decimal(line.line_total(), currency).to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        for row in unavailable_rows {
            table.modify((row, 1), dark_grey());
        }

        writeln!(out, "\n{}", grey_borders(&table.to_string())).map_err(ReceiptError::Io)?;

        let tax_label = format!(" Tax ({}%):", (TAX_RATE * Decimal::ONE_HUNDRED).normalize());

        let summary = [
            (" Subtotal:".to_string(), self.subtotal().to_string()),
            (tax_label, self.tax().to_string()),
            (" Total:".to_string(), self.total().to_string()),
        ];

        let label_width = summary.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = summary.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &summary {
            writeln!(out, "{label:>label_width$}  {value:>value_width$}").map_err(ReceiptError::Io)?;
        }

        writeln!(out).map_err(ReceiptError::Io)
    }
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in dark grey.
pub(crate) fn grey_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_border = false;

    for ch in table.chars() {
        let is_border = ('\u{2500}'..='\u{257F}').contains(&ch);

        if is_border != in_border {
            _ = out.write_str(if is_border { "\x1b[90m" } else { "\x1b[0m" });
            in_border = is_border;
        }

        out.push(ch);
    }

    if in_border {
        _ = out.write_str("\x1b[0m");
    }

    out
}

pub(crate) fn dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        cart::{CartStore, MemorySlot},
        catalog::{CatalogItem, ItemId},
    };

    use super::*;

    fn render(receipt: &Receipt<'_>) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        receipt.write_to(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn totals_match_the_cart() -> TestResult {
        let mut store = CartStore::open(MemorySlot::new(), iso::USD);

        store.add_item(
            &CatalogItem::new(ItemId::now_v7(), "Samosa", Decimal::from(500)),
            2,
        )?;

        let receipt = Receipt::new(store.cart());

        assert_eq!(receipt.subtotal(), store.subtotal());
        assert_eq!(receipt.tax(), store.tax_amount());
        assert_eq!(receipt.total(), store.total());

        Ok(())
    }

    #[test]
    fn write_to_lists_lines_and_summary() -> TestResult {
        let mut store = CartStore::open(MemorySlot::new(), iso::USD);

        store.add_item(
            &CatalogItem::new(ItemId::now_v7(), "Samosa", Decimal::from(500)),
            2,
        )?;
        store.add_item(
            &CatalogItem::new(ItemId::now_v7(), "Lassi", Decimal::new(350, 2)),
            1,
        )?;

        let output = render(&Receipt::new(store.cart()))?;

        assert!(output.contains("Samosa"));
        assert!(output.contains("Lassi"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Tax (6%):"));
        assert!(output.contains("Total:"));

        Ok(())
    }

    #[test]
    fn empty_cart_renders_a_message() -> TestResult {
        let store = CartStore::open(MemorySlot::new(), iso::USD);

        let output = render(&Receipt::new(store.cart()))?;

        assert!(output.contains("Your cart is empty."));
        assert!(!output.contains("Total:"));

        Ok(())
    }

    #[test]
    fn grey_borders_wraps_border_runs_only() {
        let output = grey_borders("╭─╮ab");

        assert_eq!(output, "\x1b[90m╭─╮\x1b[0mab");
    }
}
