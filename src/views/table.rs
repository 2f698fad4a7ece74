//! Order tables

use rusty_money::Money;
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

use crate::{
    orders::OrderRecord,
    receipt::{dark_grey, grey_borders},
    status::{LifecycleStatus, StatusTone},
    views::{Role, available_actions},
};

pub(super) fn render(role: Role, orders: &[OrderRecord]) -> String {
    if orders.is_empty() {
        return "No orders.".to_string();
    }

    let mut builder = Builder::default();
    let mut badges: SmallVec<[(usize, usize, StatusTone); 32]> = SmallVec::new();

    match role {
        Role::Admin => builder.push_record([
            "Order", "Placed", "Customer", "Items", "Total", "Payment", "Status", "Delivery",
            "Driver", "Actions",
        ]),
        Role::Driver => builder.push_record([
            "Order", "Customer", "Phone", "Address", "Total", "Payment", "Delivery", "Actions",
        ]),
    }

    for (idx, record) in orders.iter().enumerate() {
        let row = idx + 1;
        let total = Money::from_decimal(record.total, record.currency).to_string();
        let actions = available_actions(role, record)
            .iter()
            .map(|action| action.label(record.currency))
            .collect::<Vec<_>>()
            .join(", ");

        let order = LifecycleStatus::Order(record.status);
        let delivery = LifecycleStatus::Delivery(record.delivery.status);

        match role {
            Role::Admin => {
                badges.push((row, 6, order.tone()));
                badges.push((row, 7, delivery.tone()));

                builder.push_record([
                    short_id(record),
                    record.created_at.strftime("%Y-%m-%d %H:%M").to_string(),
                    record.details.customer_name.clone(),
                    record.total_items().to_string(),
                    total,
                    record.payment_method.label().to_string(),
                    order.label().to_string(),
                    delivery.label().to_string(),
                    record
                        .delivery
                        .driver
                        .map_or_else(|| "-".to_string(), |driver| short(&driver.to_string())),
                    actions,
                ]);
            }
            Role::Driver => {
                badges.push((row, 6, delivery.tone()));

                builder.push_record([
                    short_id(record),
                    record.details.customer_name.clone(),
                    record.details.phone.clone(),
                    record.details.address.clone(),
                    total,
                    record.payment_method.label().to_string(),
                    delivery.label().to_string(),
                    actions,
                ]);
            }
        }
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..5), Alignment::right());

    for (row, col, tone) in badges {
        table.modify((row, col), tone_color(tone));
    }

    grey_borders(&table.to_string())
}

fn short_id(record: &OrderRecord) -> String {
    short(&record.id.to_string())
}

fn short(id: &str) -> String {
    id.chars().take(8).collect()
}

fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Neutral => dark_grey(),
        StatusTone::Info => Color::FG_BLUE,
        StatusTone::Progress => Color::FG_YELLOW,
        StatusTone::Success => Color::FG_GREEN,
        StatusTone::Danger => Color::FG_RED,
    }
}
