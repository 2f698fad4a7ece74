//! Orders
//!
//! Order and delivery records as reported by the backend of record, plus the request shapes used
//! to create them.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    catalog::ItemId,
    status::{
        DeliveryStatus, InvalidTransition, LifecycleStatus, OrderStatus, Status, check_lifecycle,
    },
    uuids::TypedUuid,
};

/// Order identifier.
pub type OrderId = TypedUuid<OrderRecord>;

/// Marker for driver identifiers.
#[derive(Debug)]
pub struct Driver;

/// Driver identifier.
pub type DriverId = TypedUuid<Driver>;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// The driver collects the order total at the door.
    CashOnDelivery,

    /// Paid before the order is placed.
    Prepaid,
}

impl PaymentMethod {
    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on delivery",
            PaymentMethod::Prepaid => "Prepaid",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A priced line of a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Catalog identifier
    pub item_id: ItemId,

    /// Display name at order time
    pub name: String,

    /// Unit price at order time
    pub unit_price: Decimal,

    /// Number of units
    pub quantity: u32,
}

/// Where and to whom an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDetails {
    /// Customer display name
    pub customer_name: String,

    /// Contact phone number
    pub phone: String,

    /// Delivery address
    pub address: String,

    /// Free-form instructions for the kitchen or driver
    pub notes: Option<String>,
}

/// Order creation request built from a cart at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Ordered lines
    pub lines: Vec<OrderLine>,

    /// Cart subtotal
    pub subtotal: Decimal,

    /// Cart tax
    pub tax_amount: Decimal,

    /// Cart total
    pub total: Decimal,

    /// Currency all amounts are in
    pub currency: &'static Currency,

    /// Payment method tag
    pub payment_method: PaymentMethod,

    /// Delivery details
    pub delivery: DeliveryDetails,
}

/// Acknowledgement of a created order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedOrder {
    /// Assigned identifier
    pub id: OrderId,

    /// Initial status, always [`OrderStatus::Pending`]
    pub status: OrderStatus,
}

/// Delivery sub-record of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    /// Delivery status
    pub status: DeliveryStatus,

    /// Assigned driver, `None` when unassigned
    pub driver: Option<DriverId>,

    /// Cash recorded at delivery for cash-on-delivery orders
    pub cash_collected: Option<Decimal>,
}

impl DeliveryRecord {
    /// A fresh, unassigned delivery.
    pub fn pending() -> Self {
        Self {
            status: DeliveryStatus::Pending,
            driver: None,
            cash_collected: None,
        }
    }
}

/// Authoritative order record.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Identifier
    pub id: OrderId,

    /// Creation time
    pub created_at: Timestamp,

    /// Customer and address
    pub details: DeliveryDetails,

    /// Ordered lines
    pub lines: Vec<OrderLine>,

    /// Sum of the lines
    pub subtotal: Decimal,

    /// Tax on the subtotal
    pub tax_amount: Decimal,

    /// Delivery fee charged on top of the cart total
    pub delivery_fee: Decimal,

    /// Amount due: subtotal, tax and fee
    pub total: Decimal,

    /// Currency all amounts are in
    pub currency: &'static Currency,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Restaurant-side status
    pub status: OrderStatus,

    /// Delivery sub-record
    pub delivery: DeliveryRecord,
}

impl OrderRecord {
    /// The amount due as money.
    pub fn total_money(&self) -> Money<'static, Currency> {
        Money::from_decimal(self.total, self.currency)
    }

    /// Whether the driver has to collect payment.
    pub fn is_cash_on_delivery(&self) -> bool {
        self.payment_method == PaymentMethod::CashOnDelivery
    }

    /// Validate moving this order or its delivery to `requested`, including the rules that tie
    /// the two families together.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] if the move is not allowed from the current statuses.
    pub fn check_transition(&self, requested: LifecycleStatus) -> Result<(), InvalidTransition> {
        check_lifecycle(self.status, self.delivery.status, requested)
    }

    /// Whether either the order or its delivery can still change.
    pub fn is_active(&self) -> bool {
        !(self.status.is_terminal() && self.delivery.status.is_terminal())
    }

    /// Total number of units ordered.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Which orders a list query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    /// Every order
    All,

    /// Orders whose order or delivery status is not terminal
    Active,

    /// Orders currently assigned to one driver
    AssignedTo(DriverId),
}

impl OrderFilter {
    /// Whether `record` passes the filter.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Active => record.is_active(),
            OrderFilter::AssignedTo(driver) => record.delivery.driver == Some(*driver),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusty_money::iso;

    use super::*;

    /// A cash-on-delivery order with the given statuses and total.
    pub(crate) fn order(
        status: OrderStatus,
        delivery: DeliveryStatus,
        total: i64,
    ) -> OrderRecord {
        OrderRecord {
            id: OrderId::now_v7(),
            created_at: Timestamp::UNIX_EPOCH,
            details: DeliveryDetails {
                customer_name: "Asha".to_string(),
                phone: "555-0100".to_string(),
                address: "12 Curry Lane".to_string(),
                notes: None,
            },
            lines: vec![OrderLine {
                item_id: ItemId::now_v7(),
                name: "Thali".to_string(),
                unit_price: Decimal::from(total),
                quantity: 1,
            }],
            subtotal: Decimal::from(total),
            tax_amount: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            total: Decimal::from(total),
            currency: iso::USD,
            payment_method: PaymentMethod::CashOnDelivery,
            status,
            delivery: DeliveryRecord {
                status: delivery,
                driver: None,
                cash_collected: None,
            },
        }
    }
}
