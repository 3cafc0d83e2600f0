//! # Web Storage Shim
//!
//! A uniform facade over the two Web Storage areas (`localStorage` and
//! `sessionStorage`) with storage change notification:
//!
//! - **Native events**: the host's own change notifications are forwarded to
//!   registered handlers through a single listener, attached while at least
//!   one handler is registered
//! - **Emulated events**: when the host cannot notify, each mutation made
//!   through the facade synthesizes the event itself
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          StorageFacade                              │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌────────────┐  │
//! │  │  Strategy   │  │  Event Hub  │  │   Storage   │  │  Domain    │  │
//! │  │ native/emul │→ │  handlers   │  │   Layer     │  │  Models    │  │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  └────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod facade;
pub mod storage;
pub mod strategy;

use clap::Parser;
use tracing::{debug, info};

pub use crate::config::AppConfig;
pub use crate::domain::{ChangeEvent, StorageArea};
pub use crate::error::{AppError, HandlerResult, StorageError};
pub use crate::events::{CollectingSink, DispatchReport, ExceptionSink, RegistrationHandle};
pub use crate::facade::{AreaHandle, StorageFacade, StorageFacadeBuilder, create_facade};
pub use crate::strategy::StrategyKind;

use crate::cli::Cli;

/// Run the `webstorage` command line.
///
/// This function:
/// 1. Parses the command line
/// 2. Loads configuration from files and environment
/// 3. Builds the storage facade
/// 4. Registers a handler printing change events as JSON lines
/// 5. Executes the requested operation
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded
/// - Storage backend fails to initialize
/// - The storage operation fails
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting webstorage"
    );

    let facade = create_facade(&config)?;

    let registration = facade.add_change_handler(|event| {
        println!("{}", serde_json::to_string(event)?);
        Ok(())
    })?;
    debug!(handler = %registration.id(), "Change printer registered");

    for line in cli::execute(&facade, cli.area, &cli.command)? {
        println!("{line}");
    }

    registration.remove();
    Ok(())
}

/// Initialize logging based on configuration.
///
/// Logs go to stderr so stdout carries only command output.
fn init_logging(config: &AppConfig) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.observability.log_format == "json" {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
