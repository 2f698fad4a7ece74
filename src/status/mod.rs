//! Status Vocabulary
//!
//! The order and delivery status families, their transition tables, and the labels and badge
//! tones every view renders. Views must derive the actions they offer from these tables.
//!
//! The two families are not independent. [`check_lifecycle`] adds the rules that tie them
//! together:
//!
//! - the food leaves the restaurant (pickup and beyond) only once the order is `Ready`
//! - an order cannot be cancelled once the driver has collected it
//! - an order completes only after its delivery is `Delivered`
//! - a delivery becomes `Assigned` only by assigning a driver, never by request

use std::{fmt, hash::Hash};

use thiserror::Error;

pub mod delivery;
pub mod graph;
pub mod order;

pub use delivery::DeliveryStatus;
pub use graph::TransitionGraph;
pub use order::OrderStatus;

/// Visual weight a view gives a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTone {
    /// Waiting for someone to act
    Neutral,

    /// Acknowledged, not yet moving
    Info,

    /// Actively progressing
    Progress,

    /// Finished successfully
    Success,

    /// Stopped
    Danger,
}

/// Behaviour shared by every status family.
pub trait Status: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + 'static {
    /// Every value of the family, in lifecycle order.
    const ALL: &'static [Self];

    /// The state records are created in.
    const INITIAL: Self;

    /// Statuses directly reachable from `self`.
    fn successors(self) -> &'static [Self];

    /// Human readable label.
    fn label(self) -> &'static str;

    /// Badge tone for the label.
    fn tone(self) -> StatusTone;

    /// Whether no further transition is possible.
    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Whether the table allows moving from `self` to `next`.
    fn can_transition_to(self, next: Self) -> bool {
        self.successors().contains(&next)
    }
}

/// A status from either family, as requested by a view or reported in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleStatus {
    /// Restaurant-side order status
    Order(OrderStatus),

    /// Delivery sub-record status
    Delivery(DeliveryStatus),
}

impl LifecycleStatus {
    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            LifecycleStatus::Order(status) => status.label(),
            LifecycleStatus::Delivery(status) => status.label(),
        }
    }

    /// Badge tone.
    pub fn tone(self) -> StatusTone {
        match self {
            LifecycleStatus::Order(status) => status.tone(),
            LifecycleStatus::Delivery(status) => status.tone(),
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        match self {
            LifecycleStatus::Order(status) => status.is_terminal(),
            LifecycleStatus::Delivery(status) => status.is_terminal(),
        }
    }

    /// Whether this is the final delivery hand-off.
    pub fn is_delivery_completion(self) -> bool {
        self == LifecycleStatus::Delivery(DeliveryStatus::Delivered)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStatus::Order(status) => write!(f, "order {status}"),
            LifecycleStatus::Delivery(status) => write!(f, "delivery {status}"),
        }
    }
}

impl From<OrderStatus> for LifecycleStatus {
    fn from(status: OrderStatus) -> Self {
        LifecycleStatus::Order(status)
    }
}

impl From<DeliveryStatus> for LifecycleStatus {
    fn from(status: DeliveryStatus) -> Self {
        LifecycleStatus::Delivery(status)
    }
}

/// A requested status is not reachable from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move from {from} to {to}")]
pub struct InvalidTransition {
    /// Current status
    pub from: LifecycleStatus,

    /// Requested status
    pub to: LifecycleStatus,
}

/// Validate a requested transition against the table of its family.
///
/// # Errors
///
/// Returns [`InvalidTransition`] if the table rejects the pair, including when `current` and
/// `requested` belong to different families.
pub fn check_transition(
    current: LifecycleStatus,
    requested: LifecycleStatus,
) -> Result<(), InvalidTransition> {
    let allowed = match (current, requested) {
        (LifecycleStatus::Order(from), LifecycleStatus::Order(to)) => from.can_transition_to(to),
        (LifecycleStatus::Delivery(from), LifecycleStatus::Delivery(to)) => {
            from.can_transition_to(to)
        }
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(InvalidTransition {
            from: current,
            to: requested,
        })
    }
}

/// Validate a requested transition for an order whose statuses are `order` and `delivery`.
///
/// The family table is checked first. When the table allows the move but the other family
/// blocks it, the rejection names the blocking status as `from`.
///
/// # Errors
///
/// Returns [`InvalidTransition`] if the table or a cross-family rule rejects the request.
pub fn check_lifecycle(
    order: OrderStatus,
    delivery: DeliveryStatus,
    requested: LifecycleStatus,
) -> Result<(), InvalidTransition> {
    let current = match requested {
        LifecycleStatus::Order(_) => LifecycleStatus::Order(order),
        LifecycleStatus::Delivery(_) => LifecycleStatus::Delivery(delivery),
    };

    check_transition(current, requested)?;

    let blocked_by = match requested {
        LifecycleStatus::Delivery(DeliveryStatus::Assigned) => Some(current),
        LifecycleStatus::Delivery(status)
            if status.is_collected() && order != OrderStatus::Ready =>
        {
            Some(LifecycleStatus::Order(order))
        }
        LifecycleStatus::Order(OrderStatus::Cancelled) if delivery.is_collected() => {
            Some(LifecycleStatus::Delivery(delivery))
        }
        LifecycleStatus::Order(OrderStatus::Completed)
            if delivery != DeliveryStatus::Delivered =>
        {
            Some(LifecycleStatus::Delivery(delivery))
        }
        _ => None,
    };

    match blocked_by {
        Some(from) => Err(InvalidTransition {
            from,
            to: requested,
        }),
        None => Ok(()),
    }
}

/// Statuses reachable in one step from `current`, across families.
pub fn successors(current: LifecycleStatus) -> impl Iterator<Item = LifecycleStatus> {
    let (orders, deliveries): (&[OrderStatus], &[DeliveryStatus]) = match current {
        LifecycleStatus::Order(status) => (status.successors(), &[]),
        LifecycleStatus::Delivery(status) => (&[], status.successors()),
    };

    orders
        .iter()
        .copied()
        .map(LifecycleStatus::Order)
        .chain(deliveries.iter().copied().map(LifecycleStatus::Delivery))
}
