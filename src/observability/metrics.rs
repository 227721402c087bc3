//! Metrics collection.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by outcome
//!   (`valid` | `invalid` | `passthrough` | `error`)
//! - `gate_uploads_total` (counter): file parts by disposition
//!   (`accepted` | `rejected`)
//! - `gate_schema_compilations_total` (counter): lazy compilations performed
//!
//! # Design Decisions
//! - Counters only; the gate adds no histograms of its own
//! - Recording is a no-op until the host installs a metrics recorder

use metrics::counter;

/// Record one gated request and its outcome.
pub fn record_request(outcome: &'static str) {
    counter!("gate_requests_total", "outcome" => outcome).increment(1);
}

/// Record one file part and whether the filter accepted it.
pub fn record_upload(disposition: &'static str) {
    counter!("gate_uploads_total", "disposition" => disposition).increment(1);
}

/// Record one schema compilation.
pub fn record_schema_compilation() {
    counter!("gate_schema_compilations_total").increment(1);
}
