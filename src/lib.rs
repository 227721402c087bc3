//! Merge-then-validate request middleware for Axum.
//!
//! For every request passing through the gate, four input sources are merged
//! into a single candidate object and validated against a JSON Schema bound
//! to the route:
//!
//! ```text
//!     Incoming request
//!         → pipeline::multipart  (form fields + streamed uploads)
//!         → pipeline::sanitize   (HPP guard, HTML-escaping of params/query)
//!         → pipeline::merge      (multipart → params → query → JSON body)
//!         → schema               (compile-once validator per registration)
//!         → middleware::gate     (attach RequestContext, or respond 400)
//!         → downstream handler
//! ```
//!
//! A registration with no schema never rejects; it only performs extraction,
//! sanitization and merging ("global middleware" mode). Schema validation
//! failure is the only condition that produces a 400 response; everything
//! else surfaces through the generic error path.
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware, routing::post, Router};
//! use schema_gate::{Gate, GateConfig};
//! use serde_json::json;
//!
//! let gate = Gate::new(GateConfig::default())?;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! });
//!
//! let app = gate.apply(
//!     Router::new().route(
//!         "/user/{name}",
//!         post(handler).route_layer(middleware::from_fn_with_state(
//!             gate.bind(schema),
//!             schema_gate::validate,
//!         )),
//!     ),
//! );
//! ```

// Core pipeline
pub mod context;
pub mod pipeline;
pub mod schema;

// Middleware surface
pub mod middleware;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use config::GateConfig;
pub use context::{FileDescriptor, RejectedUpload, RequestContext, UploadSet};
pub use error::{GateError, PipelineError};
pub use middleware::gate::{validate, BoundSchema, Gate};
