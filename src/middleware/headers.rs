//! Security response headers.
//!
//! # Responsibilities
//! - Strip the framework-identifying `X-Powered-By` header
//! - Set `X-Frame-Options`, `X-XSS-Protection` and `Content-Security-Policy`
//!   per configuration
//!
//! # Design Decisions
//! - Header values are assembled and validated once, at gate construction
//! - The middleware only touches responses; requests pass through untouched

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::schema::HeaderConfig;
use crate::error::GateError;

const X_POWERED_BY: &str = "x-powered-by";
const X_FRAME_OPTIONS: &str = "x-frame-options";
const X_XSS_PROTECTION: &str = "x-xss-protection";
const CONTENT_SECURITY_POLICY: &str = "content-security-policy";

/// Precomputed header values for the response middleware.
#[derive(Debug)]
pub struct PreparedHeaders {
    hide_powered_by: bool,
    x_frame: Option<HeaderValue>,
    xss_filter: Option<HeaderValue>,
    csp: Option<HeaderValue>,
}

impl PreparedHeaders {
    /// Build and validate header values from configuration.
    pub fn from_config(config: &HeaderConfig) -> Result<Self, GateError> {
        let x_frame = config
            .x_frame
            .as_ref()
            .map(|opt| header_value(X_FRAME_OPTIONS_NAME, &opt.header_value()))
            .transpose()?;

        let xss_filter = config
            .xss_filter
            .then(|| HeaderValue::from_static("1; mode=block"));

        let csp = config
            .csp
            .as_ref()
            .map(|directives| {
                let policy = directives
                    .iter()
                    .map(|(directive, sources)| {
                        format!("{directive} {}", sources.join(" "))
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                header_value(CSP_NAME, &policy)
            })
            .transpose()?;

        Ok(Self {
            hide_powered_by: config.hide_powered_by,
            x_frame,
            xss_filter,
            csp,
        })
    }

    /// Whether this configuration changes any response at all.
    pub fn is_noop(&self) -> bool {
        !self.hide_powered_by
            && self.x_frame.is_none()
            && self.xss_filter.is_none()
            && self.csp.is_none()
    }

    /// Mutate a response header map in place.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if self.hide_powered_by {
            headers.remove(X_POWERED_BY);
        }
        if let Some(value) = &self.x_frame {
            headers.insert(X_FRAME_OPTIONS, value.clone());
        }
        if let Some(value) = &self.xss_filter {
            headers.insert(X_XSS_PROTECTION, value.clone());
        }
        if let Some(value) = &self.csp {
            headers.insert(CONTENT_SECURITY_POLICY, value.clone());
        }
    }
}

const X_FRAME_OPTIONS_NAME: &str = "X-Frame-Options";
const CSP_NAME: &str = "Content-Security-Policy";

fn header_value(header: &'static str, value: &str) -> Result<HeaderValue, GateError> {
    HeaderValue::from_str(value).map_err(|e| GateError::Header {
        header,
        message: e.to_string(),
    })
}

/// Middleware applying the prepared security headers to every response.
pub async fn security_headers(
    State(headers): State<Arc<PreparedHeaders>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    headers.apply(response.headers_mut());
    response
}
