//! Schema compilation and caching subsystem.
//!
//! # Data Flow
//! ```text
//! Gate::bind(schema)
//!     → cache.rs (Registration, compile-once cell)
//!     → first request assigns a Schema Key and compiles
//!     → validator.rs (jsonschema wrapper, structured errors)
//!     → every later request reuses the compiled validator
//! ```
//!
//! # Design Decisions
//! - One compiled validator per registration, never shared, even when two
//!   registrations hold structurally identical schemas
//! - The key sequence lives on the cache instance, not in a global, so
//!   independent caches can coexist in tests
//! - Compilation happens exactly once per registration; concurrent first
//!   requests block on the same cell instead of racing

pub mod cache;
pub mod validator;

use thiserror::Error;

pub use cache::{Registration, SchemaCache};
pub use validator::CompiledSchema;

/// Errors from schema compilation.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The registered document is not a valid schema for the configured
    /// draft.
    #[error("failed to compile schema under key {key}: {message}")]
    Compile { key: String, message: String },
}
