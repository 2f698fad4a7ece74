use clap::Subcommand;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tiffin::{backend::MemoryBackend, fixtures::MenuFixture};

use crate::config::Config;

mod cart;
mod menu;
mod simulate;

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the menu
    Menu,

    /// Inspect or change the persisted cart
    Cart(cart::CartCommand),

    /// Run a checkout, preparation and cash delivery against an in-memory backend
    Simulate(simulate::SimulateArgs),
}

impl Command {
    pub(crate) async fn run(self, config: &Config) -> Result<(), String> {
        let currency = config.currency()?;
        let fixture = load_menu(config, currency)?;

        match self {
            Command::Menu => menu::run(&fixture),
            Command::Cart(command) => cart::run(command, config, &fixture, currency).await,
            Command::Simulate(args) => simulate::run(args, &fixture, currency).await,
        }
    }
}

fn load_menu(config: &Config, currency: &'static Currency) -> Result<MenuFixture, String> {
    let mut fixture = MenuFixture::with_base_path(config.fixtures.clone());

    fixture
        .load_menu(&config.menu)
        .map_err(|error| format!("failed to load menu {}: {error}", config.menu))?;

    let menu_currency = fixture.currency().map_err(|error| error.to_string())?;

    if menu_currency != currency {
        return Err(format!(
            "menu {} is priced in {}, carts are in {}",
            config.menu, menu_currency.iso_alpha_code, currency.iso_alpha_code
        ));
    }

    Ok(fixture)
}

/// A backend serving the fixture menu.
async fn backend_for(fixture: &MenuFixture, delivery_fee: Decimal) -> MemoryBackend {
    let backend = MemoryBackend::new(delivery_fee);

    backend.set_menu(fixture.items().iter().cloned()).await;

    backend
}
