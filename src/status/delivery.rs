//! Delivery Status

use std::fmt;

use crate::status::{Status, StatusTone};

/// Status of an order's delivery sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeliveryStatus {
    /// Created with the order
    Pending,

    /// Food is waiting at the counter
    ReadyForPickup,

    /// A driver has been dispatched
    Assigned,

    /// The driver has the food
    PickedUp,

    /// The driver has left the restaurant
    OutForDelivery,

    /// On the road, for deliveries that report progress
    InTransit,

    /// Handed to the customer
    Delivered,

    /// Abandoned
    Cancelled,
}

impl Status for DeliveryStatus {
    const ALL: &'static [Self] = &[
        DeliveryStatus::Pending,
        DeliveryStatus::ReadyForPickup,
        DeliveryStatus::Assigned,
        DeliveryStatus::PickedUp,
        DeliveryStatus::OutForDelivery,
        DeliveryStatus::InTransit,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ];

    const INITIAL: Self = DeliveryStatus::Pending;

    fn successors(self) -> &'static [Self] {
        match self {
            DeliveryStatus::Pending => &[
                DeliveryStatus::ReadyForPickup,
                DeliveryStatus::Assigned,
                DeliveryStatus::Cancelled,
            ],
            DeliveryStatus::ReadyForPickup => {
                &[DeliveryStatus::Assigned, DeliveryStatus::Cancelled]
            }
            DeliveryStatus::Assigned => &[
                DeliveryStatus::PickedUp,
                DeliveryStatus::OutForDelivery,
                DeliveryStatus::Cancelled,
            ],
            DeliveryStatus::PickedUp => &[
                DeliveryStatus::OutForDelivery,
                DeliveryStatus::InTransit,
                DeliveryStatus::Delivered,
                DeliveryStatus::Cancelled,
            ],
            DeliveryStatus::OutForDelivery => &[
                DeliveryStatus::InTransit,
                DeliveryStatus::Delivered,
                DeliveryStatus::Cancelled,
            ],
            DeliveryStatus::InTransit => &[DeliveryStatus::Delivered, DeliveryStatus::Cancelled],
            DeliveryStatus::Delivered | DeliveryStatus::Cancelled => &[],
        }
    }

    fn label(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::ReadyForPickup => "Ready for pickup",
            DeliveryStatus::Assigned => "Assigned",
            DeliveryStatus::PickedUp => "Picked up",
            DeliveryStatus::OutForDelivery => "Out for delivery",
            DeliveryStatus::InTransit => "In transit",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Cancelled => "Cancelled",
        }
    }

    fn tone(self) -> StatusTone {
        match self {
            DeliveryStatus::Pending => StatusTone::Neutral,
            DeliveryStatus::ReadyForPickup | DeliveryStatus::Assigned => StatusTone::Info,
            DeliveryStatus::PickedUp
            | DeliveryStatus::OutForDelivery
            | DeliveryStatus::InTransit => StatusTone::Progress,
            DeliveryStatus::Delivered => StatusTone::Success,
            DeliveryStatus::Cancelled => StatusTone::Danger,
        }
    }
}

impl DeliveryStatus {
    /// Whether the driver has not collected the food yet, so the assignment may still change.
    pub fn is_pre_pickup(self) -> bool {
        matches!(
            self,
            DeliveryStatus::Pending | DeliveryStatus::ReadyForPickup | DeliveryStatus::Assigned
        )
    }

    /// Whether the driver has collected the food from the restaurant.
    pub fn is_collected(self) -> bool {
        matches!(
            self,
            DeliveryStatus::PickedUp
                | DeliveryStatus::OutForDelivery
                | DeliveryStatus::InTransit
                | DeliveryStatus::Delivered
        )
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::ReadyForPickup => "READY_FOR_PICKUP",
            DeliveryStatus::Assigned => "ASSIGNED",
            DeliveryStatus::PickedUp => "PICKED_UP",
            DeliveryStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            DeliveryStatus::InTransit => "IN_TRANSIT",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
