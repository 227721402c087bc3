//! Structured logging setup.
//!
//! The gate itself only emits `tracing` events; installing a subscriber is
//! the host application's call. This helper wires up the usual registry +
//! env-filter stack for applications that do not bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a tracing subscriber with an env-filter.
///
/// `default_filter` is used when `RUST_LOG` is unset, e.g.
/// `"schema_gate=debug,tower_http=debug"`.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
