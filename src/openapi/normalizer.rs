//! Normalization of Swagger 2.0 and OpenAPI 3.x input into one OpenAPI 3.x shape.
//!
//! Every document leaving [`SchemaNormalizer::normalize`] has passed
//! [`validate_openapi`], whatever version it arrived in.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use super::convert::{BuiltinConverter, SwaggerConverter};
use super::repair::{DefaultRepairs, SpecRepair};
use crate::core::{Error, Result};

/// Value of the `swagger` field identifying a Swagger 2.0 document
pub const SWAGGER_VERSION: &str = "2.0";

/// Converts and repairs specification documents
#[derive(Clone)]
pub struct SchemaNormalizer {
    converter: Arc<dyn SwaggerConverter>,
    repairs: Arc<dyn SpecRepair>,
}

impl std::fmt::Debug for SchemaNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaNormalizer").finish_non_exhaustive()
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinConverter), Arc::new(DefaultRepairs))
    }
}

impl SchemaNormalizer {
    pub fn new(converter: Arc<dyn SwaggerConverter>, repairs: Arc<dyn SpecRepair>) -> Self {
        Self {
            converter,
            repairs,
        }
    }

    /// Produce the canonical OpenAPI 3.x form of `spec`.
    ///
    /// `api` only labels errors.
    pub async fn normalize(&self, api: &str, spec: JsonValue) -> Result<JsonValue> {
        let spec = if is_swagger(&spec) {
            debug!(api = %api, "Converting Swagger 2.0 document");
            self.convert_swagger(spec).await?
        } else {
            let mut spec = spec;
            self.repairs.repair_openapi(&mut spec);
            spec
        };

        validate_openapi(api, &spec)?;
        Ok(spec)
    }

    /// Repair, convert and base-path-prefix a Swagger 2.0 document
    pub async fn convert_swagger(&self, mut spec: JsonValue) -> Result<JsonValue> {
        self.repairs.repair_swagger(&mut spec);
        let base_path = spec
            .get("basePath")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        let mut converted = self.converter.convert(spec).await?;

        if let Some(base_path) = base_path {
            prefix_paths(&mut converted, &base_path);
        }
        self.repairs.repair_openapi(&mut converted);
        Ok(converted)
    }
}

/// Whether the version discriminator marks a Swagger 2.0 document
pub fn is_swagger(spec: &JsonValue) -> bool {
    spec.get("swagger").and_then(JsonValue::as_str) == Some(SWAGGER_VERSION)
}

/// Move every path key under `base_path`.
///
/// A root (`/`) or empty base path leaves the keys alone. Keys are moved, so
/// the unprefixed entries are gone afterwards.
pub fn prefix_paths(spec: &mut JsonValue, base_path: &str) {
    // Trailing slashes are dropped, so `/v1/` + `/users` gives `/v1/users` rather
    // than a plain concatenation with a doubled slash.
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return;
    }
    if let Some(JsonValue::Object(paths)) = spec.get_mut("paths") {
        let original = std::mem::take(paths);
        *paths = original
            .into_iter()
            .map(|(path, item)| (format!("{base}{path}"), item))
            .collect();
    }
}

/// Sanity check of a raw document before anything is written for it
pub fn validate_raw(api: &str, spec: &JsonValue) -> Result<()> {
    for section in ["paths", "info"] {
        if spec.get(section).is_none_or(is_falsy) {
            return Err(Error::format(api, format!("missing '{section}'")));
        }
    }
    Ok(())
}

fn is_falsy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

/// The gate every normalized document must pass
pub fn validate_openapi(api: &str, spec: &JsonValue) -> Result<()> {
    let version = spec
        .get("openapi")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    if !version.starts_with("3.") {
        return Err(Error::format(
            api,
            format!("unsupported version '{version}'"),
        ));
    }
    for section in ["paths", "info"] {
        let present = spec
            .get(section)
            .and_then(JsonValue::as_object)
            .is_some_and(|map| !map.is_empty());
        if !present {
            return Err(Error::format(api, format!("missing or empty '{section}'")));
        }
    }
    Ok(())
}
