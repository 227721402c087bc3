//! Schema cache: registrations, key assignment and compile-once semantics.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::Method;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::config::schema::{SchemaDraft, SchemaKeyConfig};
use crate::observability::metrics;
use crate::schema::validator::CompiledSchema;
use crate::schema::SchemaError;

/// One route/schema binding.
///
/// Created at bind time, immutable after first compilation. The compiled
/// validator is owned exclusively by this registration and never shared.
#[derive(Debug)]
pub struct Registration {
    schema: Option<Value>,
    compiled: OnceCell<CompiledSchema>,
}

impl Registration {
    /// Whether this registration carries a schema at all. Schema-less
    /// registrations skip validation entirely.
    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }

    /// The Schema Key, once the first request has assigned it.
    pub fn assigned_key(&self) -> Option<&str> {
        self.compiled.get().map(CompiledSchema::key)
    }
}

/// Compiles each registration's schema once and hands back the cached
/// validator on every later request.
///
/// The key sequence is owned by the cache instance, so independent caches
/// (one per gate) never interfere.
#[derive(Debug)]
pub struct SchemaCache {
    use_route_as_key: bool,
    draft: Option<SchemaDraft>,
    sequence: AtomicU64,
    // Key → schema fingerprint, for collision diagnostics only.
    bindings: DashMap<String, u64>,
}

impl SchemaCache {
    pub fn new(config: &SchemaKeyConfig) -> Self {
        Self {
            use_route_as_key: config.use_route_as_key,
            draft: config.draft,
            sequence: AtomicU64::new(0),
            bindings: DashMap::new(),
        }
    }

    /// Create a registration for an optional schema.
    pub fn register(&self, schema: Option<Value>) -> Arc<Registration> {
        Arc::new(Registration {
            schema,
            compiled: OnceCell::new(),
        })
    }

    /// Resolve the compiled validator for a registration, compiling on the
    /// first call. Concurrent first requests wait on the same cell; exactly
    /// one performs the compilation.
    ///
    /// Returns `None` for schema-less registrations.
    pub async fn compiled<'r>(
        &self,
        registration: &'r Registration,
        method: &Method,
        route_path: &str,
    ) -> Result<Option<&'r CompiledSchema>, SchemaError> {
        let Some(schema) = &registration.schema else {
            return Ok(None);
        };

        let compiled = registration
            .compiled
            .get_or_try_init(|| async {
                let key = self.assign_key(method, route_path);
                self.note_binding(&key, schema);
                tracing::debug!(key = %key, "compiling schema");
                metrics::record_schema_compilation();
                CompiledSchema::compile(key, schema, self.draft)
            })
            .await?;

        Ok(Some(compiled))
    }

    /// Derive the Schema Key for a first request hitting a registration.
    fn assign_key(&self, method: &Method, route_path: &str) -> String {
        if self.use_route_as_key {
            let encoded: String =
                url::form_urlencoded::byte_serialize(route_path.as_bytes()).collect();
            format!("{method}_{encoded}")
        } else {
            format!("k_{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
        }
    }

    /// Track which schema landed on which key. Two different schemas on one
    /// key is a collision the route-derived policy cannot prevent; it is
    /// logged but not resolved, since validators are per-registration
    /// anyway.
    fn note_binding(&self, key: &str, schema: &Value) {
        let fingerprint = fingerprint(schema);
        match self.bindings.insert(key.to_string(), fingerprint) {
            Some(previous) if previous != fingerprint => {
                tracing::warn!(
                    key = %key,
                    "schema key collision: a different schema was already compiled under this key"
                );
            }
            _ => {}
        }
    }
}

fn fingerprint(schema: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    schema.to_string().hash(&mut hasher);
    hasher.finish()
}
