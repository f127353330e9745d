//! oas-sdkgen CLI entrypoint
//! Parses command-line arguments and runs the generation orchestrator.
#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use oas_sdkgen::config::{CliConfig, ConfigSource, DEFAULT_SDK_DIR};
use oas_sdkgen::generation::GenerationOrchestrator;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oas-sdkgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate TypeScript services from Swagger/OpenAPI documents
    Generate {
        /// Configuration files (JSON, YAML or TOML) exporting one or more configurations
        config_files: Vec<PathBuf>,
        /// URL or path of a document to generate from without a configuration file
        #[arg(long)]
        api: Option<String>,
        /// Output directory for the inline configuration
        #[arg(long, default_value = DEFAULT_SDK_DIR)]
        sdk_dir: PathBuf,
        /// Write origin.json and oas.json next to the generated files
        #[arg(long)]
        save_openapi_data: bool,
        /// Keep previously generated files in the output directory
        #[arg(long)]
        no_auto_clear: bool,
        /// File names never removed when clearing the output directory
        #[arg(long = "ignore-delete")]
        ignore_delete: Vec<String>,
        /// Name of a user-provided request library imported from `./base.<name>`
        #[arg(long)]
        request_lib: Option<String>,
        /// Directory with templates overriding the built-in service, index and base templates
        #[arg(long)]
        template_path: Option<PathBuf>,
        /// Template file overriding the built-in typings template
        #[arg(long)]
        interface_template_path: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            config_files,
            api,
            sdk_dir,
            save_openapi_data,
            no_auto_clear,
            ignore_delete,
            request_lib,
            template_path,
            interface_template_path,
        } => {
            let mut sources: Vec<ConfigSource> =
                config_files.into_iter().map(ConfigSource::from).collect();

            if let Some(api) = api {
                let mut config = CliConfig::new(api, sdk_dir);
                config.save_openapi_data = save_openapi_data;
                config.auto_clear = !no_auto_clear;
                config.ignore_delete = ignore_delete.into_iter().collect::<BTreeSet<_>>();
                config.request_lib = request_lib;
                config.template_path = template_path;
                config.interface_template_path = interface_template_path;
                sources.push(ConfigSource::from(config));
            }

            if sources.is_empty() {
                anyhow::bail!("Nothing to generate: pass a configuration file or --api");
            }

            let orchestrator = GenerationOrchestrator::with_defaults()
                .context("Failed to set up generation")?;
            let reports = orchestrator
                .generate(sources)
                .await
                .context("Generation failed")?;

            for report in &reports {
                info!(
                    api = %report.api,
                    sdk_dir = %report.sdk_dir.display(),
                    written = report.written.len(),
                    removed = report.removed.len(),
                    "Generated SDK"
                );
            }
        }
    }

    Ok(())
}
