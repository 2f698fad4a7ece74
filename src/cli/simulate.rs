use std::{io, sync::Arc};

use clap::Args;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tiffin::{
    backend::MemoryBackend,
    cart::{CartStore, CheckoutDetails, MemorySlot},
    catalog::Catalog as _,
    fixtures::MenuFixture,
    lifecycle::{LifecycleController, LifecycleError},
    orders::{DeliveryDetails, DriverId, OrderId, PaymentMethod},
    receipt::Receipt,
    status::{DeliveryStatus, LifecycleStatus, OrderStatus, graph::explain},
    views::{Action, AdminTable, DriverDashboard, ViewError},
};
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct SimulateArgs {
    /// Menu keys to order, each once
    #[arg(default_values = ["samosa", "biryani", "lassi"])]
    items: Vec<String>,

    /// Delivery fee added by the order service
    #[arg(long, default_value = "2.99")]
    delivery_fee: Decimal,

    /// Also place a second order whose delivery is cancelled while the driver tries to collect it
    #[arg(long)]
    race: bool,
}

pub(super) async fn run(
    args: SimulateArgs,
    fixture: &MenuFixture,
    currency: &'static Currency,
) -> Result<(), String> {
    let backend = super::backend_for(fixture, args.delivery_fee).await;
    let controller = LifecycleController::new(Arc::new(backend.clone()), Arc::new(backend.clone()));
    let driver = DriverId::now_v7();

    let mut admin = AdminTable::new(controller.clone());
    let mut dashboard = DriverDashboard::new(controller, driver);
    let mut out = io::stdout().lock();

    let mut store = CartStore::open(MemorySlot::new(), currency);

    for key in &args.items {
        let item = fixture.resolve(key).map_err(|error| error.to_string())?;

        store
            .add_from_catalog(&backend, item.id, 1)
            .await
            .map_err(|error| error.to_string())?;
    }

    Receipt::new(store.cart())
        .write_to(&mut out)
        .map_err(|error| error.to_string())?;

    let order = store
        .checkout(&backend, details())
        .await
        .map_err(|error| error.to_string())?;

    info!(order_id = %order.id, "simulated checkout");

    admin.refresh().await.map_err(describe)?;
    show(&mut out, "Order placed", &admin.render())?;

    admin
        .perform(order.id, Action::to(OrderStatus::Preparing))
        .await
        .map_err(describe)?;
    admin.assign(order.id, Some(driver)).await.map_err(describe)?;
    admin
        .perform(order.id, Action::to(OrderStatus::Ready))
        .await
        .map_err(describe)?;
    show(&mut out, "Kitchen ready, driver assigned", &admin.render())?;

    dashboard.refresh().await.map_err(describe)?;
    dashboard
        .perform(order.id, Action::to(DeliveryStatus::PickedUp))
        .await
        .map_err(describe)?;
    dashboard
        .perform(order.id, Action::to(DeliveryStatus::OutForDelivery))
        .await
        .map_err(describe)?;
    show(&mut out, "Driver on the way", &dashboard.render())?;

    let deliver = delivered_action(&dashboard, order.id)?;

    dashboard.perform(order.id, deliver).await.map_err(describe)?;

    if args.race {
        race(&mut out, &backend, &mut admin, &mut dashboard, currency).await?;
    }

    admin.refresh().await.map_err(describe)?;
    show(&mut out, "Final state", &admin.render())
}

/// Dispatch cancels a delivery before the driver's pickup lands; the pickup must lose.
async fn race(
    out: &mut impl io::Write,
    backend: &MemoryBackend,
    admin: &mut AdminTable,
    dashboard: &mut DriverDashboard,
    currency: &'static Currency,
) -> Result<(), String> {
    let mut store = CartStore::open(MemorySlot::new(), currency);

    if let Some(item) = backend
        .menu()
        .await
        .map_err(|error| error.to_string())?
        .into_iter()
        .find(|item| item.is_available)
    {
        store.add_item(&item, 1).map_err(|error| error.to_string())?;
    }

    let order = store
        .checkout(backend, details())
        .await
        .map_err(|error| error.to_string())?;

    admin.refresh().await.map_err(describe)?;
    admin
        .perform(order.id, Action::to(OrderStatus::Preparing))
        .await
        .map_err(describe)?;
    admin
        .assign(order.id, Some(dashboard.driver()))
        .await
        .map_err(describe)?;
    admin
        .perform(order.id, Action::to(OrderStatus::Ready))
        .await
        .map_err(describe)?;
    dashboard.refresh().await.map_err(describe)?;

    admin
        .perform(order.id, Action::to(DeliveryStatus::Cancelled))
        .await
        .map_err(describe)?;

    let pickup = dashboard
        .perform(order.id, Action::to(DeliveryStatus::PickedUp))
        .await;

    let written = match pickup {
        Err(error) => writeln!(out, "\nPickup refused: {}", describe(error)),
        Ok(_) => writeln!(out, "\nPickup unexpectedly succeeded"),
    };

    written.map_err(|error| error.to_string())
}

fn delivered_action(dashboard: &DriverDashboard, id: OrderId) -> Result<Action, String> {
    dashboard
        .actions(id)
        .map_err(describe)?
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
        .ok_or_else(|| "delivery cannot be completed yet".to_string())
}

fn details() -> CheckoutDetails {
    CheckoutDetails {
        payment_method: PaymentMethod::CashOnDelivery,
        delivery: DeliveryDetails {
            customer_name: "Meera Iyer".to_string(),
            phone: "555-0142".to_string(),
            address: "7 Cardamom Court".to_string(),
            notes: Some("Leave at the side gate".to_string()),
        },
    }
}

fn show(out: &mut impl io::Write, title: &str, table: &str) -> Result<(), String> {
    writeln!(out, "\n{title}\n{table}").map_err(|error| error.to_string())
}

fn describe(error: ViewError) -> String {
    match error {
        ViewError::Lifecycle(LifecycleError::InvalidTransition(rejection)) => explain(&rejection),
        other => other.to_string(),
    }
}
