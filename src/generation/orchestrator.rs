//! Generation orchestration - coordinates fetch, normalization, output and emission

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info};

use crate::config::{CliConfig, ConfigSource};
use crate::core::{Error, Result};
use crate::generation::EmissionEngine;
use crate::generator::ServiceGenerator;
use crate::openapi::{CompositeSpecFetcher, SchemaNormalizer, SpecFetcher, validate_raw};
use crate::output::{
    NORMALIZED_SNAPSHOT, ORIGIN_SNAPSHOT, clear_stale_files, ensure_directory, write_snapshot,
};

/// Outcome of one successful configuration job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub api: String,
    pub sdk_dir: PathBuf,
    pub removed: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
}

/// Runs one generation job per configuration
#[derive(Clone)]
pub struct GenerationOrchestrator {
    fetcher: Arc<dyn SpecFetcher>,
    normalizer: SchemaNormalizer,
    engine: Arc<dyn EmissionEngine>,
}

impl std::fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl GenerationOrchestrator {
    /// Create a new generation orchestrator
    pub fn new(
        fetcher: Arc<dyn SpecFetcher>,
        normalizer: SchemaNormalizer,
        engine: Arc<dyn EmissionEngine>,
    ) -> Self {
        Self {
            fetcher,
            normalizer,
            engine,
        }
    }

    /// HTTP and file fetching, built-in normalization and the TypeScript engine
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            Arc::new(CompositeSpecFetcher::new()?),
            SchemaNormalizer::default(),
            Arc::new(ServiceGenerator::new()),
        ))
    }

    /// Run every configuration behind `sources` concurrently.
    ///
    /// All jobs run to completion; afterwards the first failure in source order
    /// is returned, otherwise one report per configuration.
    pub async fn generate<I>(&self, sources: I) -> Result<Vec<GenerationReport>>
    where
        I: IntoIterator<Item = ConfigSource>,
    {
        let results = join_all(sources.into_iter().map(|source| self.run_source(source))).await;

        let mut reports = Vec::new();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(batch) => reports.extend(batch),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    async fn run_source(&self, source: ConfigSource) -> Result<Vec<GenerationReport>> {
        let label = source.label();
        let configs = source.resolve().await.map_err(|e| {
            error!(source = %label, error = %e, "Failed to load configuration");
            e
        })?;
        debug!(source = %label, count = configs.len(), "Resolved configurations");

        let jobs = configs
            .into_iter()
            .map(|config| self.generate_from_url(config.with_absolute_paths()));

        let mut reports = Vec::new();
        let mut first_error = None;
        for result in join_all(jobs).await {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    /// Fetch the document named by `config.api`, parse it as JSON and generate
    pub async fn generate_from_url(&self, config: CliConfig) -> Result<GenerationReport> {
        let result = async {
            let body = self.fetcher.fetch(&config.api).await?;
            let spec: JsonValue = serde_json::from_str(&body).map_err(|e| {
                Error::fetch(&config.api, format!("response is not valid JSON: {e}"))
            })?;
            self.generate_from_data(&config, spec).await
        }
        .await;

        result.map_err(|e| {
            error!(api = %config.api, error = %e, "Generation failed");
            e
        })
    }

    /// Generate from an already parsed document.
    ///
    /// Stages run strictly in order: raw validation, output directory creation,
    /// origin snapshot, normalization, normalized snapshot, reconciliation, emission.
    pub async fn generate_from_data(
        &self,
        config: &CliConfig,
        spec: JsonValue,
    ) -> Result<GenerationReport> {
        if config.sdk_dir.as_os_str().is_empty() {
            return Err(Error::config_load(format!(
                "empty sdk_dir for {}",
                config.api
            )));
        }
        validate_raw(&config.api, &spec)?;

        ensure_directory(&config.sdk_dir).await?;

        if config.save_openapi_data {
            write_snapshot(&config.sdk_dir, ORIGIN_SNAPSHOT, &spec).await?;
        }

        let spec = self.normalizer.normalize(&config.api, spec).await?;

        if config.save_openapi_data {
            write_snapshot(&config.sdk_dir, NORMALIZED_SNAPSHOT, &spec).await?;
        }

        let removed = clear_stale_files(config).await?;
        let written = self.engine.generate_files(config, spec).await?;

        info!(
            api = %config.api,
            sdk_dir = %config.sdk_dir.display(),
            removed = removed.len(),
            "Generation complete"
        );

        Ok(GenerationReport {
            api: config.api.clone(),
            sdk_dir: config.sdk_dir.clone(),
            removed,
            written,
        })
    }
}
