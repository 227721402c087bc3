//! Middleware surface: the gate itself and the security-header layer.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → gate.rs (run the merge pipeline, validate, attach context or 400)
//! Outgoing response:
//!     → headers.rs (strip X-Powered-By, add frame/XSS/CSP headers)
//! ```
//!
//! # Design Decisions
//! - The gate is a plain axum `from_fn_with_state` middleware so it can be
//!   layered per-route or across a whole router
//! - Security headers are precomputed at gate construction; misconfigured
//!   values fail at startup, never per request

pub mod gate;
pub mod headers;

pub use gate::{validate, BoundSchema, Gate, GateBuilder};
pub use headers::security_headers;
