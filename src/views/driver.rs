//! Driver dashboard

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::{
    lifecycle::LifecycleController,
    orders::{DriverId, OrderFilter, OrderId, OrderRecord},
    views::{Action, Board, Role, ViewError, available_actions, table},
};

/// Orders assigned to one driver, with delivery actions.
#[derive(Debug)]
pub struct DriverDashboard {
    controller: LifecycleController,
    driver: DriverId,
    board: Board,
}

impl DriverDashboard {
    /// An empty dashboard for `driver`.
    pub fn new(controller: LifecycleController, driver: DriverId) -> Self {
        Self {
            controller,
            driver,
            board: Board::default(),
        }
    }

    /// The driver this dashboard belongs to.
    pub fn driver(&self) -> DriverId {
        self.driver
    }

    /// Cached orders.
    pub fn orders(&self) -> &[OrderRecord] {
        &self.board.orders
    }

    /// Reload the driver's orders. Orders reassigned to someone else drop out.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Lifecycle`] if the backend is unavailable; the cached list is kept.
    pub async fn refresh(&mut self) -> Result<&[OrderRecord], ViewError> {
        let mut orders = self
            .controller
            .list(OrderFilter::AssignedTo(self.driver))
            .await?;

        orders.retain(|record| record.delivery.driver == Some(self.driver));

        debug!(driver = %self.driver, count = orders.len(), "driver dashboard refreshed");

        self.board.orders = orders;

        Ok(&self.board.orders)
    }

    /// Actions offered for a listed order.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotListed`] if the order is not cached.
    pub fn actions(&self, id: OrderId) -> Result<SmallVec<[Action; 6]>, ViewError> {
        Ok(available_actions(Role::Driver, self.board.get(id)?))
    }

    /// Apply a delivery action and cache the refreshed record.
    ///
    /// For a cash-on-delivery order, marking it delivered needs the collected amount in
    /// `collect_cash`; the offered action already carries the order total.
    ///
    /// # Errors
    ///
    /// - [`ViewError::NotListed`]: the order is not cached.
    /// - [`ViewError::NotOffered`]: the action is not a driver action for the cached status.
    /// - [`ViewError::Lifecycle`]: the controller refused or failed; the cache is unchanged.
    pub async fn perform(&mut self, id: OrderId, action: Action) -> Result<OrderRecord, ViewError> {
        let Action::Transition { status, .. } = action else {
            return Err(self.board.not_offered(id, &action));
        };

        self.board.ensure_offered(Role::Driver, id, &action)?;

        let record = self
            .controller
            .transition(id, status, action.context())
            .await?;

        if record.delivery.driver == Some(self.driver) {
            self.board.replace(record.clone());
        } else {
            info!(order_id = %id, driver = %self.driver, "order reassigned away");
            self.board.remove(id);
        }

        Ok(record)
    }

    /// Render the cached orders.
    pub fn render(&self) -> String {
        table::render(Role::Driver, &self.board.orders)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        backend::{MemoryBackend, OrderMutation},
        lifecycle::LifecycleError,
        orders::test_support::order,
        status::{DeliveryStatus, LifecycleStatus, OrderStatus},
    };

    use super::*;

    async fn dashboard_with(
        backend: &MemoryBackend,
        mut record: OrderRecord,
    ) -> Result<(DriverDashboard, OrderId), ViewError> {
        let driver = DriverId::now_v7();
        let id = record.id;

        record.delivery.driver = Some(driver);
        backend.insert_order(record).await;

        let mut dashboard = DriverDashboard::new(
            LifecycleController::new(Arc::new(backend.clone()), Arc::new(backend.clone())),
            driver,
        );

        dashboard.refresh().await?;

        Ok((dashboard, id))
    }

    #[tokio::test]
    async fn lists_only_the_drivers_orders() -> TestResult {
        let backend = MemoryBackend::default();

        backend
            .insert_order(order(OrderStatus::Ready, DeliveryStatus::Pending, 100))
            .await;

        let (dashboard, id) = dashboard_with(
            &backend,
            order(OrderStatus::Ready, DeliveryStatus::Assigned, 100),
        )
        .await?;

        assert_eq!(dashboard.orders().len(), 1);
        assert_eq!(dashboard.orders().first().map(|r| r.id), Some(id));

        Ok(())
    }

    #[tokio::test]
    async fn reassigned_orders_drop_out_on_refresh() -> TestResult {
        let backend = MemoryBackend::default();

        let (mut dashboard, id) = dashboard_with(
            &backend,
            order(OrderStatus::Preparing, DeliveryStatus::Assigned, 100),
        )
        .await?;

        backend.assign_driver(id, Some(DriverId::now_v7())).await?;
        dashboard.refresh().await?;

        assert!(dashboard.orders().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn pickup_through_cash_delivery() -> TestResult {
        let backend = MemoryBackend::default();

        let (mut dashboard, id) = dashboard_with(
            &backend,
            order(OrderStatus::Ready, DeliveryStatus::Assigned, 1200),
        )
        .await?;

        dashboard
            .perform(id, Action::to(DeliveryStatus::PickedUp))
            .await?;
        dashboard
            .perform(id, Action::to(DeliveryStatus::OutForDelivery))
            .await?;

        let deliver = dashboard
            .actions(id)?
            .into_iter()
            .find(|action| {
                matches!(
                    action,
                    Action::Transition {
                        status: LifecycleStatus::Delivery(DeliveryStatus::Delivered),
                        ..
                    }
                )
            })
            .ok_or("delivered not offered")?;

        let record = dashboard.perform(id, deliver).await?;

        assert_eq!(record.delivery.status, DeliveryStatus::Delivered);
        assert_eq!(record.delivery.cash_collected, Some(Decimal::from(1200)));
        assert_eq!(record.status, OrderStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn cash_delivery_without_amount_is_refused() -> TestResult {
        let backend = MemoryBackend::default();

        let (mut dashboard, id) = dashboard_with(
            &backend,
            order(OrderStatus::Ready, DeliveryStatus::OutForDelivery, 1200),
        )
        .await?;

        let result = dashboard
            .perform(id, Action::to(DeliveryStatus::Delivered))
            .await;

        assert!(matches!(
            result,
            Err(ViewError::Lifecycle(LifecycleError::PaymentNotConfirmed { .. }))
        ));
        assert_eq!(
            dashboard.orders().first().map(|r| r.delivery.status),
            Some(DeliveryStatus::OutForDelivery)
        );

        Ok(())
    }

    #[tokio::test]
    async fn delivery_waits_while_the_kitchen_is_preparing() -> TestResult {
        let backend = MemoryBackend::default();

        let (mut dashboard, id) = dashboard_with(
            &backend,
            order(OrderStatus::Preparing, DeliveryStatus::OutForDelivery, 1200),
        )
        .await?;

        let result = dashboard
            .perform(
                id,
                Action::Transition {
                    status: DeliveryStatus::Delivered.into(),
                    collect_cash: Some(Decimal::from(1200)),
                },
            )
            .await;

        assert!(matches!(result, Err(ViewError::NotOffered { .. })));
        assert!(dashboard.actions(id)?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn drivers_cannot_cancel_or_assign() -> TestResult {
        let backend = MemoryBackend::default();

        let (mut dashboard, id) = dashboard_with(
            &backend,
            order(OrderStatus::Preparing, DeliveryStatus::Assigned, 100),
        )
        .await?;

        let cancel = dashboard
            .perform(id, Action::to(DeliveryStatus::Cancelled))
            .await;
        let assign = dashboard.perform(id, Action::Assign).await;

        assert!(matches!(cancel, Err(ViewError::NotOffered { .. })));
        assert!(matches!(assign, Err(ViewError::NotOffered { .. })));

        Ok(())
    }
}
