//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters: requests, uploads, compilations)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; host applications pick the subscriber
//! - Metrics are cheap counter increments against whatever recorder the
//!   host application installs

pub mod logging;
pub mod metrics;
