//! Role Views
//!
//! The admin table and the driver dashboard. Both keep a cached list of order records, offer
//! only the actions the status table and their role allow, and replace a cached record with the
//! re-fetched one after every successful action.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    lifecycle::{LifecycleError, TransitionContext},
    orders::{OrderId, OrderRecord},
    status::{DeliveryStatus, LifecycleStatus, OrderStatus, successors},
};

mod admin;
mod driver;
mod table;

pub use admin::AdminTable;
pub use driver::DriverDashboard;

/// View failures.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The order is not in the view's cached list.
    #[error("order {0} is not listed in this view")]
    NotListed(OrderId),

    /// The view does not offer this action for the order's current status.
    #[error("{action} is not available for order {id}")]
    NotOffered {
        /// Target order
        id: OrderId,

        /// Label of the refused action
        action: String,
    },

    /// The controller refused or failed the action.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Who is looking at the orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Restaurant staff
    Admin,

    /// Delivery driver
    Driver,
}

const ADMIN_STATUSES: &[LifecycleStatus] = &[
    LifecycleStatus::Order(OrderStatus::Preparing),
    LifecycleStatus::Order(OrderStatus::Ready),
    LifecycleStatus::Order(OrderStatus::Completed),
    LifecycleStatus::Order(OrderStatus::Cancelled),
    LifecycleStatus::Delivery(DeliveryStatus::ReadyForPickup),
    LifecycleStatus::Delivery(DeliveryStatus::Cancelled),
];

const DRIVER_STATUSES: &[LifecycleStatus] = &[
    LifecycleStatus::Delivery(DeliveryStatus::PickedUp),
    LifecycleStatus::Delivery(DeliveryStatus::OutForDelivery),
    LifecycleStatus::Delivery(DeliveryStatus::InTransit),
    LifecycleStatus::Delivery(DeliveryStatus::Delivered),
];

impl Role {
    /// Statuses this role may request.
    pub fn requestable(self) -> &'static [LifecycleStatus] {
        match self {
            Role::Admin => ADMIN_STATUSES,
            Role::Driver => DRIVER_STATUSES,
        }
    }

    /// Whether this role may request `status`.
    pub fn may_request(self, status: LifecycleStatus) -> bool {
        self.requestable().contains(&status)
    }

    /// Whether this role manages driver assignment.
    pub fn may_assign(self) -> bool {
        self == Role::Admin
    }
}

/// Something a view offers to do with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the order or its delivery to `status`.
    Transition {
        /// Target status
        status: LifecycleStatus,

        /// Cash the driver must confirm collecting first
        collect_cash: Option<Decimal>,
    },

    /// Assign, reassign or unassign the driver.
    Assign,
}

impl Action {
    /// A plain transition to `status`.
    pub fn to(status: impl Into<LifecycleStatus>) -> Self {
        Action::Transition {
            status: status.into(),
            collect_cash: None,
        }
    }

    /// Button label, with amounts shown in `currency`.
    pub fn label(&self, currency: &Currency) -> String {
        match self {
            Action::Assign => "Assign driver".to_string(),
            Action::Transition {
                status: LifecycleStatus::Order(OrderStatus::Cancelled),
                ..
            } => "Cancel order".to_string(),
            Action::Transition {
                status: LifecycleStatus::Delivery(DeliveryStatus::Cancelled),
                ..
            } => "Cancel delivery".to_string(),
            Action::Transition {
                status,
                collect_cash: Some(amount),
            } => format!(
                "Collect {} and mark {}",
                Money::from_decimal(*amount, currency),
                status.label()
            ),
            Action::Transition { status, .. } => format!("Mark {}", status.label()),
        }
    }

    /// Whether two actions do the same thing, ignoring any cash amount.
    fn same_kind(&self, other: &Action) -> bool {
        match (self, other) {
            (Action::Assign, Action::Assign) => true,
            (Action::Transition { status: a, .. }, Action::Transition { status: b, .. }) => a == b,
            _ => false,
        }
    }

    fn context(&self) -> TransitionContext {
        match self {
            Action::Transition {
                collect_cash: Some(amount),
                ..
            } => TransitionContext::with_cash(*amount),
            _ => TransitionContext::default(),
        }
    }
}

/// Actions `role` may take on `record` right now, derived from the status table.
pub fn available_actions(role: Role, record: &OrderRecord) -> SmallVec<[Action; 6]> {
    let current = [
        LifecycleStatus::Order(record.status),
        LifecycleStatus::Delivery(record.delivery.status),
    ];

    let mut actions: SmallVec<[Action; 6]> = current
        .into_iter()
        .flat_map(successors)
        .filter(|&status| role.may_request(status) && record.check_transition(status).is_ok())
        .map(|status| Action::Transition {
            status,
            collect_cash: (status.is_delivery_completion() && record.is_cash_on_delivery())
                .then_some(record.total),
        })
        .collect();

    if role.may_assign() && record.delivery.status.is_pre_pickup() {
        actions.push(Action::Assign);
    }

    actions
}

/// Cached records shared by both views.
#[derive(Debug, Default)]
struct Board {
    orders: Vec<OrderRecord>,
}

impl Board {
    fn get(&self, id: OrderId) -> Result<&OrderRecord, ViewError> {
        self.orders
            .iter()
            .find(|record| record.id == id)
            .ok_or(ViewError::NotListed(id))
    }

    /// Refuse `action` unless the view currently offers it.
    fn ensure_offered(&self, role: Role, id: OrderId, action: &Action) -> Result<(), ViewError> {
        let record = self.get(id)?;

        if available_actions(role, record)
            .iter()
            .any(|offered| offered.same_kind(action))
        {
            Ok(())
        } else {
            Err(self.not_offered(id, action))
        }
    }

    fn not_offered(&self, id: OrderId, action: &Action) -> ViewError {
        match self.get(id) {
            Ok(record) => ViewError::NotOffered {
                id,
                action: action.label(record.currency),
            },
            Err(error) => error,
        }
    }

    fn replace(&mut self, record: OrderRecord) {
        match self.orders.iter_mut().find(|cached| cached.id == record.id) {
            Some(cached) => *cached = record,
            None => self.orders.push(record),
        }
    }

    fn remove(&mut self, id: OrderId) {
        self.orders.retain(|record| record.id != id);
    }
}

#[cfg(test)]
mod tests {
    use crate::{orders::test_support::order, status::Status};

    use super::*;

    #[test]
    fn admin_sees_preparation_cancellation_and_assignment() {
        let record = order(OrderStatus::Pending, DeliveryStatus::Pending, 100);

        let actions = available_actions(Role::Admin, &record);

        assert!(actions.contains(&Action::to(OrderStatus::Preparing)));
        assert!(actions.contains(&Action::to(OrderStatus::Cancelled)));
        assert!(actions.contains(&Action::to(DeliveryStatus::ReadyForPickup)));
        assert!(actions.contains(&Action::to(DeliveryStatus::Cancelled)));
        assert!(actions.contains(&Action::Assign));
        assert_eq!(actions.len(), 5);
    }

    #[test]
    fn driver_sees_only_delivery_progress() {
        let record = order(OrderStatus::Ready, DeliveryStatus::Assigned, 100);

        let actions = available_actions(Role::Driver, &record);

        assert_eq!(
            actions.as_slice(),
            &[
                Action::to(DeliveryStatus::PickedUp),
                Action::to(DeliveryStatus::OutForDelivery),
            ]
        );
    }

    #[test]
    fn driver_waits_for_the_kitchen() {
        let assigned = order(OrderStatus::Preparing, DeliveryStatus::Assigned, 100);
        let in_flight = order(OrderStatus::Preparing, DeliveryStatus::OutForDelivery, 100);

        assert!(available_actions(Role::Driver, &assigned).is_empty());
        assert!(available_actions(Role::Driver, &in_flight).is_empty());
    }

    #[test]
    fn admin_cannot_cancel_collected_orders_or_complete_early() {
        let record = order(OrderStatus::Preparing, DeliveryStatus::PickedUp, 100);
        let ready = order(OrderStatus::Ready, DeliveryStatus::OutForDelivery, 100);

        assert!(
            !available_actions(Role::Admin, &record).contains(&Action::to(OrderStatus::Cancelled))
        );
        assert!(
            !available_actions(Role::Admin, &ready).contains(&Action::to(OrderStatus::Completed))
        );
    }

    #[test]
    fn cash_delivery_action_carries_the_total() {
        let record = order(OrderStatus::Ready, DeliveryStatus::OutForDelivery, 1200);

        let actions = available_actions(Role::Driver, &record);

        assert!(actions.contains(&Action::Transition {
            status: DeliveryStatus::Delivered.into(),
            collect_cash: Some(Decimal::from(1200)),
        }));
    }

    #[test]
    fn terminal_records_offer_nothing() {
        let record = order(OrderStatus::Completed, DeliveryStatus::Delivered, 100);

        assert!(available_actions(Role::Admin, &record).is_empty());
        assert!(available_actions(Role::Driver, &record).is_empty());
    }

    #[test]
    fn actions_never_leave_the_table() {
        for &order_status in OrderStatus::ALL {
            for &delivery_status in DeliveryStatus::ALL {
                let record = order(order_status, delivery_status, 100);

                for role in [Role::Admin, Role::Driver] {
                    for action in available_actions(role, &record) {
                        if let Action::Transition { status, .. } = action {
                            assert!(
                                record.check_transition(status).is_ok(),
                                "{role:?} offered {status} from {order_status}/{delivery_status}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn labels_read_naturally() {
        let usd = rusty_money::iso::USD;

        assert_eq!(Action::to(OrderStatus::Ready).label(usd), "Mark Ready");
        assert_eq!(Action::to(OrderStatus::Cancelled).label(usd), "Cancel order");
        assert_eq!(Action::Assign.label(usd), "Assign driver");
        assert!(
            Action::Transition {
                status: DeliveryStatus::Delivered.into(),
                collect_cash: Some(Decimal::from(12)),
            }
            .label(usd)
            .starts_with("Collect ")
        );
    }
}
