//! # printhmi
//!
//! Touch display controller for 3D printers running Klipper behind
//! Moonraker. Mirrors printer state onto a TJC / Nextion serial display and
//! turns touches into printer commands.
//!
//! ## Architecture
//!
//! printhmi is organized as a workspace with multiple crates:
//!
//! 1. **printhmi-core** - Status model, connection state, events, errors
//! 2. **printhmi-communication** - Moonraker client, connection supervisor,
//!    printer commands, TJC display driver
//! 3. **printhmi-settings** - Configuration file
//! 4. **printhmi-ui** - Page state machine and page catalogs
//! 5. **printhmi** - Main binary that wires the crates together

pub mod app;
pub mod cli;

pub use app::{moonraker_params, run, tjc_params};
pub use cli::Cli;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output with target, level, thread and line information
/// - RUST_LOG environment variable support
/// - INFO as the default level, DEBUG when `verbose` is set
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
