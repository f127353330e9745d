//! Port interfaces for the generation pipeline

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::CliConfig;
use crate::core::Result;

/// Turns a normalized OpenAPI 3.x document into files under `config.sdk_dir`
#[async_trait]
pub trait EmissionEngine: Send + Sync {
    /// Emit every file for `spec` and return the written paths
    async fn generate_files(&self, config: &CliConfig, spec: JsonValue) -> Result<Vec<PathBuf>>;
}
