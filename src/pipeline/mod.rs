//! The per-request merge pipeline.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → multipart.rs (form fields + streamed uploads)
//!     → sanitize.rs  (pollution guard, HTML escaping)
//!     → merge.rs     (multipart → params → query → JSON body)
//!     → schema validation (see crate::schema)
//! ```
//!
//! # Design Decisions
//! - Each stage is a pure-ish function over plain data so it can be tested
//!   without an HTTP server
//! - Extraction must complete before sanitization/merge; merge must complete
//!   before validation
//! - A failed stage fails the whole pipeline for that request; no retries

pub mod merge;
pub mod multipart;
pub mod sanitize;
