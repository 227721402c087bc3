//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or programmatic GateConfig
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, all errors reported)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc by the gate
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a gate is built
//! - All fields have defaults so a minimal (or empty) config works
//! - Validation separates syntactic (serde) from semantic checks
//! - The file-acceptance predicate is programmatic only; it has no serde
//!   representation and is supplied through `Gate::builder()`

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CollapsePolicy;
pub use schema::GateConfig;
pub use schema::SchemaDraft;
pub use schema::XFrameOption;
