//! Tiffin CLI

use std::process;

use crate::config::Cli;

mod cli;
mod config;
mod logging;

#[tokio::main]
async fn main() {
    let Cli { config, command } = Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = logging::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, so stderr is the only channel left"
        )]
        {
            eprintln!("Failed to initialise logging: {error}");
        }

        process::exit(1);
    }

    if let Err(error) = command.run(&config).await {
        #[expect(
            clippy::print_stderr,
            reason = "command errors are reported to the user on stderr"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }
}
