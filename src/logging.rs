//! Structured logging setup.
//!
//! The HTTP layer logs through `tracing`; services carry slog component
//! loggers derived from the root logger built here, so service-level events
//! always identify their component.

use slog::{o, Drain, Logger};

/// Builds the root terminal logger for the process.
pub fn setup_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!(
            "service" => "logistics-api",
            "version" => env!("CARGO_PKG_VERSION"),
        ),
    )
}

/// Derives a component logger from a parent logger.
pub fn component_logger(parent: &Logger, component: &'static str) -> Logger {
    parent.new(o!("component" => component))
}
