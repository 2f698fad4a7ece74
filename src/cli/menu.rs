use std::io::{self, Write as _};

use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use tiffin::fixtures::MenuFixture;

pub(super) fn run(fixture: &MenuFixture) -> Result<(), String> {
    let currency = fixture.currency().map_err(|error| error.to_string())?;
    let mut builder = Builder::default();

    builder.push_record(["Key", "Item", "Price", ""]);

    for item in fixture.items() {
        builder.push_record([
            fixture.key_of(item.id).unwrap_or_default().to_string(),
            item.name.clone(),
            Money::from_decimal(item.price, currency).to_string(),
            if item.is_available {
                String::new()
            } else {
                "unavailable".to_string()
            },
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..3), Alignment::right());

    writeln!(io::stdout().lock(), "{table}").map_err(|error| error.to_string())
}
