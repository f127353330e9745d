//! Generation job configuration.
//!
//! A [`CliConfig`] describes one generation job. Configurations reach the
//! orchestrator through a [`ConfigSource`]: either inline, or as a reference to
//! a JSON/YAML/TOML file exporting one or many configurations.
//!
//! Deserializing a partial record fills every missing field from
//! [`CliConfig::default`], so loading a file is also the merge over defaults.
//!
//! # Example
//!
//! ```rust
//! use oas_sdkgen::config::CliConfig;
//!
//! let config: CliConfig = serde_json::from_str(
//!     r#"{ "api": "https://petstore.swagger.io/v2/swagger.json", "sdk_dir": "src/api" }"#,
//! )
//! .unwrap();
//! assert!(config.auto_clear);
//! assert!(config.ignore_delete.is_empty());
//! ```

pub mod paths;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::core::{Error, Result};
pub use paths::absolute_path;

/// Default output directory, relative to the working directory
pub const DEFAULT_SDK_DIR: &str = "service";

/// Default namespace for generated interfaces
pub const DEFAULT_NAMESPACE: &str = "API";

/// Configuration of one generation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// URL or path of the specification
    pub api: String,

    /// Directory receiving the generated SDK
    #[serde(alias = "sdkDir")]
    pub sdk_dir: PathBuf,

    /// Template file used for `typings.d.ts`
    #[serde(alias = "interfaceTemplatePath")]
    pub interface_template_path: Option<PathBuf>,

    /// Directory holding service/index/base template overrides
    #[serde(alias = "templatePath")]
    pub template_path: Option<PathBuf>,

    /// Write `origin.json` and `oas.json` snapshots next to the SDK
    #[serde(alias = "saveOpenAPIData")]
    pub save_openapi_data: bool,

    /// Delete previously generated files before writing
    #[serde(alias = "autoClear")]
    pub auto_clear: bool,

    /// File names never deleted by auto-clear
    #[serde(alias = "ignoreDelete")]
    pub ignore_delete: BTreeSet<String>,

    /// Name of a user-owned transport module (`base.<name>.ts`)
    #[serde(alias = "requestLib")]
    pub request_lib: Option<String>,

    /// Namespace wrapping the generated interfaces
    pub namespace: String,

    /// Generator options not interpreted by the pipeline
    #[serde(flatten)]
    pub options: Map<String, JsonValue>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api: String::new(),
            sdk_dir: PathBuf::from(DEFAULT_SDK_DIR),
            interface_template_path: None,
            template_path: None,
            save_openapi_data: false,
            auto_clear: true,
            ignore_delete: BTreeSet::new(),
            request_lib: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            options: Map::new(),
        }
    }
}

impl CliConfig {
    /// Create a configuration for `api` writing into `sdk_dir`
    pub fn new<A: Into<String>, P: Into<PathBuf>>(api: A, sdk_dir: P) -> Self {
        Self {
            api: api.into(),
            sdk_dir: sdk_dir.into(),
            ..Default::default()
        }
    }

    /// Anchor the output directory and both template paths at the working directory
    pub fn with_absolute_paths(mut self) -> Self {
        if let Some(sdk_dir) = absolute_path(Some(&self.sdk_dir)) {
            self.sdk_dir = sdk_dir;
        }
        self.interface_template_path = absolute_path(self.interface_template_path.as_deref());
        self.template_path = absolute_path(self.template_path.as_deref());
        self
    }

    /// Whether a user-supplied transport base file is in use
    pub fn uses_custom_transport(&self) -> bool {
        self.request_lib
            .as_deref()
            .is_some_and(|lib| !lib.trim().is_empty())
    }
}

/// Where a configuration comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// A file exporting one configuration, a list of them, or a `default` entry
    Module(PathBuf),
    /// A configuration given directly
    Inline(Box<CliConfig>),
    /// Anything else; rejected when resolved
    Invalid(String),
}

impl From<CliConfig> for ConfigSource {
    fn from(config: CliConfig) -> Self {
        Self::Inline(Box::new(config))
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        Self::Module(path)
    }
}

impl From<&str> for ConfigSource {
    fn from(path: &str) -> Self {
        Self::Module(PathBuf::from(path))
    }
}

impl From<JsonValue> for ConfigSource {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::String(path) => Self::Module(PathBuf::from(path)),
            JsonValue::Object(_) => match serde_json::from_value::<CliConfig>(value.clone()) {
                Ok(config) => Self::Inline(Box::new(config)),
                Err(_) => Self::Invalid(value.to_string()),
            },
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl ConfigSource {
    /// Turn this source into the configurations it stands for
    pub async fn resolve(self) -> Result<Vec<CliConfig>> {
        match self {
            Self::Inline(config) => Ok(vec![*config]),
            Self::Module(path) => load_module(&path).await,
            Self::Invalid(value) => Err(Error::config_load(format!("fail load config: {value}"))),
        }
    }

    /// Short description used in logs
    pub fn label(&self) -> String {
        match self {
            Self::Module(path) => path.display().to_string(),
            Self::Inline(config) => config.api.clone(),
            Self::Invalid(value) => value.clone(),
        }
    }
}

async fn load_module(path: &Path) -> Result<Vec<CliConfig>> {
    let path = absolute_path(Some(path)).unwrap_or_else(|| path.to_path_buf());
    debug!(path = %path.display(), "Loading configuration module");

    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        Error::config_load(format!("fail load config: {}: {e}", path.display()))
    })?;
    let value = parse_module(&path, &content)?;
    exported_configs(value)
        .map_err(|e| Error::config_load(format!("{}: {e}", path.display())))
}

fn parse_module(path: &Path, content: &str) -> Result<JsonValue> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let value = match extension {
        "json" => serde_json::from_str(content)?,
        "yaml" | "yml" => serde_yaml::from_str(content)?,
        "toml" => toml::from_str(content)?,
        _ => serde_json::from_str(content).or_else(|_| serde_yaml::from_str(content))?,
    };
    Ok(value)
}

/// Resolve the value a module exports into configurations.
///
/// An object with a `default` entry exports that entry. Arrays are flattened.
fn exported_configs(value: JsonValue) -> std::result::Result<Vec<CliConfig>, String> {
    let exported = match value {
        JsonValue::Object(mut map) if map.contains_key("default") => {
            map.remove("default").unwrap_or(JsonValue::Null)
        }
        other => other,
    };

    let entries = match exported {
        JsonValue::Array(entries) => entries,
        single => vec![single],
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            JsonValue::Object(_) => serde_json::from_value::<CliConfig>(entry)
                .map_err(|e| format!("fail load config: {e}")),
            other => Err(format!("fail load config: {other}")),
        })
        .collect()
}
