//! The validation gate: registration factory and request middleware.
//!
//! # Responsibilities
//! - Validate configuration and build the shared schema cache (fail fast)
//! - Hand out [`BoundSchema`] registrations for routes
//! - Run the per-request pipeline: multipart → sanitize → merge → validate
//! - Attach [`RequestContext`] on success, respond 400 on schema failure
//!
//! # Design Decisions
//! - The gate is framework-thin: every pipeline stage operates on plain
//!   data, this module only adapts axum requests in and responses out
//! - Only schema validation failure produces a 400 with a structured body;
//!   malformed multipart is a 400 with a plain message, everything else
//!   surfaces as a 500 through the generic error path

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, RawPathParams, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{Map, Value};

use crate::config::schema::GateConfig;
use crate::config::validation::validate_config;
use crate::context::{FileDescriptor, FileFilter, RequestContext};
use crate::error::{GateError, PipelineError};
use crate::middleware::headers::PreparedHeaders;
use crate::observability::metrics;
use crate::pipeline::multipart::{self, ExtractedMultipart};
use crate::pipeline::{merge, sanitize};
use crate::schema::{Registration, SchemaCache};

/// Registration factory. Owns the configuration, the schema cache and the
/// optional file filter; cheap to clone.
#[derive(Clone)]
pub struct Gate {
    inner: Arc<GateInner>,
}

pub(crate) struct GateInner {
    config: GateConfig,
    cache: SchemaCache,
    file_filter: Option<FileFilter>,
    headers: Arc<PreparedHeaders>,
}

impl Gate {
    /// Build a gate from a validated configuration.
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> GateBuilder {
        GateBuilder {
            config: GateConfig::default(),
            file_filter: None,
        }
    }

    /// Bind a JSON Schema, producing the state for one gated route.
    ///
    /// The schema compiles lazily on the first request that reaches the
    /// registration.
    pub fn bind(&self, schema: Value) -> BoundSchema {
        BoundSchema {
            gate: self.inner.clone(),
            registration: self.inner.cache.register(Some(schema)),
        }
    }

    /// A schema-less registration: extraction, sanitization and merging
    /// run, but no validation ever rejects. Use this to gate a whole
    /// router the way plain middleware would.
    pub fn passthrough(&self) -> BoundSchema {
        BoundSchema {
            gate: self.inner.clone(),
            registration: self.inner.cache.register(None),
        }
    }

    /// Attach the configured security-header middleware to a router.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if self.inner.headers.is_noop() {
            return router;
        }
        router.layer(axum::middleware::from_fn_with_state(
            self.inner.headers.clone(),
            crate::middleware::headers::security_headers,
        ))
    }

    pub fn config(&self) -> &GateConfig {
        &self.inner.config
    }
}

/// Builder for [`Gate`], for callers that need a file filter.
pub struct GateBuilder {
    config: GateConfig,
    file_filter: Option<FileFilter>,
}

impl GateBuilder {
    pub fn config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Install the file-acceptance predicate consulted for every uploaded
    /// file part.
    pub fn file_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&FileDescriptor, &axum::http::HeaderMap) -> bool + Send + Sync + 'static,
    {
        self.file_filter = Some(Arc::new(filter));
        self
    }

    /// Validate the configuration and build the gate. Misconfiguration is
    /// a startup-time fatal.
    pub fn build(self) -> Result<Gate, GateError> {
        validate_config(&self.config).map_err(GateError::Config)?;
        let headers = Arc::new(PreparedHeaders::from_config(&self.config.headers)?);
        let cache = SchemaCache::new(&self.config.schema_keys);

        Ok(Gate {
            inner: Arc::new(GateInner {
                config: self.config,
                cache,
                file_filter: self.file_filter,
                headers,
            }),
        })
    }
}

/// One registration bound to the gate; the state for [`validate`].
#[derive(Clone)]
pub struct BoundSchema {
    gate: Arc<GateInner>,
    registration: Arc<Registration>,
}

impl BoundSchema {
    /// The Schema Key assigned to this registration, once compiled.
    pub fn assigned_key(&self) -> Option<String> {
        self.registration.assigned_key().map(str::to_owned)
    }
}

/// The gate middleware. Layer it with
/// `axum::middleware::from_fn_with_state(gate.bind(schema), schema_gate::validate)`.
pub async fn validate(
    State(bound): State<BoundSchema>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match run_pipeline(&bound, req).await {
        Ok(Outcome::Pass(req)) => next.run(req).await,
        Ok(Outcome::Reject(errors)) => {
            metrics::record_request("invalid");
            (StatusCode::BAD_REQUEST, Json(Value::Array(errors))).into_response()
        }
        Err(err) => {
            metrics::record_request("error");
            error_response(err)
        }
    }
}

enum Outcome {
    /// Context attached; hand the request to the downstream service.
    Pass(Request<Body>),
    /// Candidate rejected by the schema; respond 400, downstream never runs.
    Reject(Vec<Value>),
}

async fn run_pipeline(
    bound: &BoundSchema,
    req: Request<Body>,
) -> Result<Outcome, PipelineError> {
    let config = &bound.gate.config;
    let (mut parts, body) = req.into_parts();

    // Route params exist once routing has matched; absent otherwise.
    let mut params = Map::new();
    if let Ok(raw) = RawPathParams::from_request_parts(&mut parts, &()).await {
        for (name, value) in raw.iter() {
            params.insert(name.to_string(), Value::String(value.to_string()));
        }
    }

    let query_pairs = parts
        .uri
        .query()
        .map(sanitize::parse_query)
        .unwrap_or_default();

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let content_length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    // Multipart consumes the body; JSON bodies are buffered and restored
    // for downstream extractors.
    let mut extracted = ExtractedMultipart::default();
    let mut body_json = None;
    let downstream_body = if config.multipart.enabled
        && content_type.starts_with("multipart/form-data")
    {
        let boundary = multer::parse_boundary(&content_type)
            .map_err(|e| PipelineError::MalformedMultipart(e.to_string()))?;
        let parser = multer::Multipart::new(body.into_data_stream(), boundary);
        extracted = multipart::extract(
            parser,
            &config.multipart,
            bound.gate.file_filter.as_ref(),
            &parts.headers,
            content_length,
        )
        .await?;
        Body::empty()
    } else if is_json(&content_type) {
        let bytes = axum::body::to_bytes(body, config.limits.max_body_bytes)
            .await
            .map_err(|e| PipelineError::BodyRead(e.to_string()))?;
        body_json = merge::parse_body(&bytes);
        Body::from(bytes)
    } else {
        body
    };

    // The guard runs before sanitization whenever enabled, regardless of
    // the sanitize flag.
    let mut query = if config.sanitize.hpp_protection {
        sanitize::collapse_pollution(query_pairs, config.sanitize.hpp_policy)
    } else {
        sanitize::assemble_query(query_pairs)
    };
    if config.sanitize.url_encoded {
        sanitize::sanitize_values(&mut params);
        sanitize::sanitize_values(&mut query);
    }

    let candidate = merge::build_candidate(extracted.fields, params, query, body_json);

    // Key derivation prefers the matched route template over the raw path.
    let route_path = parts
        .extensions
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let compiled = bound
        .gate
        .cache
        .compiled(&bound.registration, &parts.method, &route_path)
        .await?;

    let context = match compiled {
        None => {
            metrics::record_request("passthrough");
            RequestContext {
                valid_json: Some(candidate),
                files: extracted.uploads,
            }
        }
        Some(validator) => {
            if validator.is_valid(&candidate) {
                metrics::record_request("valid");
                RequestContext {
                    valid_json: Some(candidate),
                    files: extracted.uploads,
                }
            } else {
                let errors = validator.errors(&candidate);
                tracing::debug!(
                    key = validator.key(),
                    violations = errors.len(),
                    "candidate rejected by schema"
                );
                return Ok(Outcome::Reject(errors));
            }
        }
    };

    parts.extensions.insert(context);
    Ok(Outcome::Pass(Request::from_parts(parts, downstream_body)))
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();
    mime == "application/json" || mime.ends_with("+json")
}

fn error_response(err: PipelineError) -> Response {
    match err {
        PipelineError::MalformedMultipart(_) => {
            tracing::debug!(error = %err, "rejecting malformed multipart request");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        PipelineError::FileTooLarge { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()).into_response()
        }
        err => {
            tracing::error!(error = %err, "request pipeline failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn misconfiguration_fails_at_build_time() {
        let mut config = GateConfig::default();
        config.limits.max_body_bytes = 0;
        let err = Gate::new(config).err().expect("zero body limit must fail");
        assert!(matches!(err, GateError::Config(_)));
    }

    #[test]
    fn bindings_get_independent_registrations() {
        let gate = Gate::new(GateConfig::default()).unwrap();
        let schema = json!({"type": "object"});
        let a = gate.bind(schema.clone());
        let b = gate.bind(schema);
        assert!(!Arc::ptr_eq(&a.registration, &b.registration));
    }

    #[test]
    fn json_content_type_detection() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("application/vnd.api+json"));
        assert!(!is_json("text/plain"));
        assert!(!is_json("multipart/form-data; boundary=x"));
    }
}
