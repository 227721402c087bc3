//! Compiled JSON Schema wrapper with structured error reporting.

use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::{json, Value};

use crate::config::schema::SchemaDraft;
use crate::schema::SchemaError;

/// A schema compiled under a Schema Key.
///
/// Owned exclusively by one registration; the accept/reject decision for a
/// given input is deterministic across calls.
#[derive(Debug)]
pub struct CompiledSchema {
    key: String,
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    /// Compile `schema` under `key`, optionally forcing a draft.
    ///
    /// Without an explicit draft the engine infers one from the schema's
    /// `$schema` field.
    pub fn compile(
        key: String,
        schema: &Value,
        draft: Option<SchemaDraft>,
    ) -> Result<Self, SchemaError> {
        let built = match draft {
            Some(draft) => jsonschema::options()
                .with_draft(draft.engine_draft())
                .build(schema),
            None => jsonschema::options().build(schema),
        };
        let validator = built.map_err(|e| SchemaError::Compile {
            key: key.clone(),
            message: e.to_string(),
        })?;

        Ok(Self { key, validator })
    }

    /// The Schema Key this validator was compiled under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fast accept/reject check.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }

    /// Full structured error list for a rejected candidate, in the shape
    /// the 400 response body carries.
    pub fn errors(&self, value: &Value) -> Vec<Value> {
        self.validator
            .iter_errors(value)
            .map(|e| error_document(&e))
            .collect()
    }
}

fn error_document(error: &ValidationError<'_>) -> Value {
    json!({
        "message": error.to_string(),
        "instancePath": error.instance_path.to_string(),
        "keyword": keyword(&error.kind),
    })
}

/// Map an engine error kind to the schema keyword it violated.
fn keyword(kind: &ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
        ValidationErrorKind::UnevaluatedProperties { .. } => "unevaluatedProperties",
        ValidationErrorKind::Required { .. } => "required",
        ValidationErrorKind::Type { .. } => "type",
        ValidationErrorKind::Enum { .. } => "enum",
        ValidationErrorKind::Pattern { .. } => "pattern",
        ValidationErrorKind::Format { .. } => "format",
        ValidationErrorKind::Minimum { .. } => "minimum",
        ValidationErrorKind::Maximum { .. } => "maximum",
        ValidationErrorKind::MinLength { .. } => "minLength",
        ValidationErrorKind::MaxLength { .. } => "maxLength",
        ValidationErrorKind::MinItems { .. } => "minItems",
        ValidationErrorKind::MaxItems { .. } => "maxItems",
        _ => "schema",
    }
}
