//! End-to-end order lifecycle against the in-memory backend.
//!
//! A customer checks out a cash-on-delivery cart, the kitchen prepares it and assigns a driver,
//! and the driver delivers it. A second order is used to check that concurrent actors cannot
//! both win: dispatch cancels its delivery while the driver's dashboard still shows it as
//! collectable.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use rust_decimal::Decimal;
use rusty_money::iso::USD;
use tiffin::prelude::*;

struct Session {
    backend: MemoryBackend,
    admin: AdminTable,
    dashboard: DriverDashboard,
    driver: DriverId,
}

impl Session {
    async fn new(menu: &[CatalogItem]) -> Self {
        let backend = MemoryBackend::new(Decimal::new(299, 2));

        backend.set_menu(menu.iter().cloned()).await;

        let controller =
            LifecycleController::new(Arc::new(backend.clone()), Arc::new(backend.clone()));
        let driver = DriverId::now_v7();

        Self {
            admin: AdminTable::new(controller.clone()),
            dashboard: DriverDashboard::new(controller, driver),
            backend,
            driver,
        }
    }

    async fn place_order(&self, item: &CatalogItem, quantity: u32) -> Result<OrderId> {
        let mut store = CartStore::open(MemorySlot::new(), USD);

        store
            .add_from_catalog(&self.backend, item.id, quantity)
            .await?;

        let created = store
            .checkout(
                &self.backend,
                CheckoutDetails {
                    payment_method: PaymentMethod::CashOnDelivery,
                    delivery: DeliveryDetails {
                        customer_name: "Kabir".to_string(),
                        phone: "555-0199".to_string(),
                        address: "3 Saffron Street".to_string(),
                        notes: None,
                    },
                },
            )
            .await?;

        if !store.cart().is_empty() {
            bail!("cart was not cleared after checkout");
        }

        Ok(created.id)
    }
}

fn menu() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(ItemId::now_v7(), "Chicken Biryani", Decimal::from(500)),
        CatalogItem::new(ItemId::now_v7(), "Weekend Thali", Decimal::from(800)).unavailable(),
    ]
}

fn delivered(actions: &[Action]) -> Option<Action> {
    actions.iter().copied().find(|action| {
        matches!(
            action,
            Action::Transition {
                status: LifecycleStatus::Delivery(DeliveryStatus::Delivered),
                ..
            }
        )
    })
}

#[tokio::test]
async fn cash_order_runs_from_checkout_to_completion() -> Result<()> {
    let menu = menu();
    let biryani = menu.first().context("menu is empty")?;
    let mut session = Session::new(&menu).await;

    let id = session.place_order(biryani, 2).await?;

    session.admin.refresh().await?;

    let placed = session
        .admin
        .orders()
        .first()
        .context("order not listed")?
        .clone();

    assert_eq!(placed.subtotal, Decimal::from(1000));
    assert_eq!(placed.tax_amount, Decimal::from(60));
    assert_eq!(placed.total, Decimal::new(106_299, 2));
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.delivery.status, DeliveryStatus::Pending);

    session
        .admin
        .perform(id, Action::to(OrderStatus::Preparing))
        .await?;
    session.admin.assign(id, Some(session.driver)).await?;
    session
        .admin
        .perform(id, Action::to(OrderStatus::Ready))
        .await?;

    session.dashboard.refresh().await?;
    session
        .dashboard
        .perform(id, Action::to(DeliveryStatus::PickedUp))
        .await?;

    // The admin table has not refreshed since the pickup, so the controller has the final word.
    let locked = session.admin.assign(id, None).await;

    assert!(
        matches!(
            locked,
            Err(ViewError::Lifecycle(LifecycleError::AssignmentLocked {
                status: DeliveryStatus::PickedUp
            }))
        ),
        "driver could still be changed after pickup: {locked:?}"
    );

    session
        .dashboard
        .perform(id, Action::to(DeliveryStatus::OutForDelivery))
        .await?;

    let action = delivered(&session.dashboard.actions(id)?).context("delivery not offered")?;

    assert_eq!(
        action,
        Action::Transition {
            status: DeliveryStatus::Delivered.into(),
            collect_cash: Some(placed.total),
        }
    );

    let done = session.dashboard.perform(id, action).await?;

    assert_eq!(done.delivery.status, DeliveryStatus::Delivered);
    assert_eq!(done.delivery.cash_collected, Some(placed.total));
    assert_eq!(done.status, OrderStatus::Completed);

    session.admin.refresh().await?;

    assert!(
        session
            .admin
            .actions(id)?
            .is_empty(),
        "completed order still offers actions"
    );

    Ok(())
}

#[tokio::test]
async fn driver_waits_for_the_kitchen() -> Result<()> {
    let menu = menu();
    let biryani = menu.first().context("menu is empty")?;
    let mut session = Session::new(&menu).await;

    let id = session.place_order(biryani, 1).await?;

    session.admin.refresh().await?;
    session
        .admin
        .perform(id, Action::to(OrderStatus::Preparing))
        .await?;
    session.admin.assign(id, Some(session.driver)).await?;
    session.dashboard.refresh().await?;

    let early = session
        .dashboard
        .perform(id, Action::to(DeliveryStatus::PickedUp))
        .await;

    assert!(
        matches!(early, Err(ViewError::NotOffered { .. })),
        "pickup offered while preparing: {early:?}"
    );
    assert_eq!(
        session.backend.get_order(id).await?.delivery.status,
        DeliveryStatus::Assigned
    );

    session
        .admin
        .perform(id, Action::to(OrderStatus::Ready))
        .await?;
    session.dashboard.refresh().await?;

    let picked = session
        .dashboard
        .perform(id, Action::to(DeliveryStatus::PickedUp))
        .await?;

    assert_eq!(picked.status, OrderStatus::Ready);
    assert_eq!(picked.delivery.status, DeliveryStatus::PickedUp);

    Ok(())
}

#[tokio::test]
async fn delivery_cancellation_beats_a_stale_pickup() -> Result<()> {
    let menu = menu();
    let biryani = menu.first().context("menu is empty")?;
    let mut session = Session::new(&menu).await;

    let id = session.place_order(biryani, 1).await?;

    session.admin.refresh().await?;
    session
        .admin
        .perform(id, Action::to(OrderStatus::Preparing))
        .await?;
    session.admin.assign(id, Some(session.driver)).await?;
    session
        .admin
        .perform(id, Action::to(OrderStatus::Ready))
        .await?;
    session.dashboard.refresh().await?;

    session
        .admin
        .perform(id, Action::to(DeliveryStatus::Cancelled))
        .await?;

    let pickup = session
        .dashboard
        .perform(id, Action::to(DeliveryStatus::PickedUp))
        .await;

    let rejection = match pickup {
        Err(ViewError::Lifecycle(LifecycleError::InvalidTransition(rejection))) => rejection,
        other => bail!("expected the pickup to be rejected, got {other:?}"),
    };

    assert_eq!(rejection.from, DeliveryStatus::Cancelled.into());
    assert_eq!(rejection.to, DeliveryStatus::PickedUp.into());

    let record = session.backend.get_order(id).await?;

    assert_eq!(record.status, OrderStatus::Ready);
    assert_eq!(record.delivery.status, DeliveryStatus::Cancelled);

    Ok(())
}

#[tokio::test]
async fn unavailable_items_never_reach_the_cart() -> Result<()> {
    let menu = menu();
    let thali = menu.get(1).context("menu too short")?;
    let session = Session::new(&menu).await;

    let result = session.place_order(thali, 1).await;

    let error = result.err().context("unavailable item was ordered")?;

    assert!(
        matches!(
            error.downcast_ref::<CartError>(),
            Some(CartError::Unavailable { .. })
        ),
        "unexpected error: {error:?}"
    );
    assert!(session.backend.list_orders(OrderFilter::All).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn outage_leaves_the_cached_view_alone() -> Result<()> {
    let menu = menu();
    let biryani = menu.first().context("menu is empty")?;
    let mut session = Session::new(&menu).await;

    let id = session.place_order(biryani, 1).await?;

    session.admin.refresh().await?;
    session.backend.set_offline(true).await;

    let result = session
        .admin
        .perform(id, Action::to(OrderStatus::Preparing))
        .await;

    assert!(matches!(
        result,
        Err(ViewError::Lifecycle(LifecycleError::BackendUnavailable(_)))
    ));
    assert_eq!(
        session.admin.orders().first().map(|order| order.status),
        Some(OrderStatus::Pending)
    );

    session.backend.set_offline(false).await;

    let prepared = session
        .admin
        .perform(id, Action::to(OrderStatus::Preparing))
        .await?;

    assert_eq!(prepared.status, OrderStatus::Preparing);

    Ok(())
}
