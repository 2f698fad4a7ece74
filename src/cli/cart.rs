use std::io::{self, Write as _};

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tiffin::{
    cart::{CartError, CartStore, FileSlot, LoadOutcome},
    fixtures::MenuFixture,
    receipt::Receipt,
};
use tracing::warn;

use crate::config::Config;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart with its totals
    Show,

    /// Add an item by menu key or id
    Add {
        /// Menu key or item id
        item: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove an item's line
    Remove {
        /// Menu key or item id
        item: String,
    },

    /// Set an item's quantity; zero or less removes it
    Update {
        /// Menu key or item id
        item: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Empty the cart
    Clear,
}

pub(super) async fn run(
    command: CartCommand,
    config: &Config,
    fixture: &MenuFixture,
    currency: &'static Currency,
) -> Result<(), String> {
    let mut store = CartStore::open(FileSlot::new(config.cart_dir.clone()), currency);

    match store.load_outcome() {
        LoadOutcome::Discarded(error) => {
            warn!(%error, "stored cart was corrupt and has been reset");
        }
        LoadOutcome::Unreadable(error) => {
            return Err(format!("stored cart could not be read: {error}"));
        }
        LoadOutcome::Empty | LoadOutcome::Restored => {}
    }

    let changed = match command.command {
        CartSubcommand::Show => Ok(()),
        CartSubcommand::Add { item, quantity } => {
            let item = fixture.resolve(&item).map_err(|error| error.to_string())?;
            let backend = super::backend_for(fixture, Decimal::ZERO).await;

            store.add_from_catalog(&backend, item.id, quantity).await
        }
        CartSubcommand::Remove { item } => {
            let item = fixture.resolve(&item).map_err(|error| error.to_string())?;

            store.remove_item(item.id)
        }
        CartSubcommand::Update { item, quantity } => {
            let item = fixture.resolve(&item).map_err(|error| error.to_string())?;

            store.update_quantity(item.id, quantity)
        }
        CartSubcommand::Clear => store.clear_cart(),
    };

    match changed {
        Ok(()) => {}
        Err(CartError::Persist(error)) => {
            warn!(%error, "cart changed but could not be saved");
        }
        Err(error) => return Err(error.to_string()),
    }

    Receipt::new(store.cart())
        .write_to(io::stdout().lock())
        .map_err(|error| error.to_string())?;

    writeln!(io::stdout().lock(), "{} item(s)", store.total_items())
        .map_err(|error| error.to_string())
}
