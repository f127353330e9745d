//! Error handling for the SDK generation pipeline.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Every failure that belongs to a
//! single generation job carries the source identifier of that job, so that a
//! caller running many configurations at once can tell which one failed.
//!
//! # Examples
//!
//! ```
//! use oas_sdkgen::core::error::{Error, Result};
//!
//! fn might_fail(api: &str) -> Result<()> {
//!     Err(Error::format(api, "missing paths"))
//! }
//!
//! assert!(might_fail("https://example.com/api.json").is_err());
//! ```

use thiserror::Error;

/// Result type for SDK generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SDK generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration source could not be turned into configurations
    #[error("Failed to load config: {0}")]
    ConfigLoad(String),

    /// The specification could not be retrieved or was not JSON
    #[error("Failed to fetch spec from {api}: {message}")]
    Fetch { api: String, message: String },

    /// The specification is structurally unusable
    #[error("Invalid spec format from {api}: {reason} (only OpenAPI 3.0/Swagger 2.0 are supported)")]
    Format { api: String, reason: String },

    /// Swagger 2.0 to OpenAPI 3.x conversion failed
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// The emission engine could not load or render a template
    #[error("Template error: {0}")]
    Template(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    /// Create a new configuration-load error
    pub fn config_load<S: Into<String>>(msg: S) -> Self {
        Self::ConfigLoad(msg.into())
    }

    /// Create a new fetch error tagged with its source
    pub fn fetch<A: Into<String>, M: ToString>(api: A, message: M) -> Self {
        Self::Fetch {
            api: api.into(),
            message: message.to_string(),
        }
    }

    /// Create a new format error tagged with its source
    pub fn format<A: Into<String>, R: Into<String>>(api: A, reason: R) -> Self {
        Self::Format {
            api: api.into(),
            reason: reason.into(),
        }
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// The source identifier this error is tagged with, if any
    pub fn api(&self) -> Option<&str> {
        match self {
            Self::Fetch { api, .. } | Self::Format { api, .. } => Some(api),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_config_load_creation() {
        let error = Error::config_load("fail load config: 42");
        assert!(matches!(error, Error::ConfigLoad(_)));
        assert_eq!(error.to_string(), "Failed to load config: fail load config: 42");
        assert!(error.api().is_none());
    }

    #[test]
    fn test_error_fetch_names_source() {
        let error = Error::fetch("http://localhost/spec.json", "HTTP 404 Not Found");
        assert_eq!(error.api(), Some("http://localhost/spec.json"));
        assert!(error.to_string().contains("http://localhost/spec.json"));
        assert!(error.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_error_format_names_versions() {
        let error = Error::format("./api.json", "missing paths");
        let message = error.to_string();
        assert!(message.contains("./api.json"));
        assert!(message.contains("OpenAPI 3.0/Swagger 2.0"));
        assert_eq!(error.api(), Some("./api.json"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_serde_json_error() {
        let json_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("invalid json");
        let error: Error = json_result.unwrap_err().into();
        assert!(matches!(error, Error::Json(_)));
        assert!(error.to_string().contains("JSON parsing error"));
    }
}
