#![warn(missing_docs)]

//! Entry point for the `winarrange` binary.

mod cli;
mod commands;
mod effective;
mod error;
mod fixture;

use std::process;

use arranger::DEFAULT_TOLERANCE;
use clap::Parser;
use config::{ArrangeSettings, RonStore};
use tokio::runtime::Runtime;
use tracing::{debug, error};

use crate::{
    cli::{Cli, Commands},
    commands::Session,
    error::Result,
    fixture::DesktopFixture,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, load the desktop and settings, and
/// dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli {
        log,
        desktop,
        settings,
        command,
    } = Cli::parse();
    logging::init(&log.spec());

    let fixture = DesktopFixture::load(&desktop)?;
    let path = config::resolve_settings_path(settings.as_deref());
    let store = RonStore::load(&path)?;
    let prefs = ArrangeSettings::load(&store)?;
    debug!(path = %path.display(), ?prefs, "settings loaded");

    let tolerance = match &command {
        Commands::Monitor(m) => m.tolerance,
        _ => DEFAULT_TOLERANCE,
    };
    let mut session = Session::new(fixture.desktop(), store, prefs, tolerance);
    let runtime = Runtime::new()?;
    match command {
        Commands::Detect(args) => commands::detect(&session, &args),
        Commands::Arrange(args) => {
            runtime.block_on(commands::arrange(&mut session, &args, fixture.script))
        }
        Commands::Monitor(args) => {
            runtime.block_on(commands::monitor(&mut session, &args, fixture.script))
        }
    }
}
