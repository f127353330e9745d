//! TypeScript service emission.
//!
//! Renders `typings.d.ts`, one service module per tag, an `index.ts` barrel and,
//! unless a custom request library is configured, the `base.ts` transport.

pub mod model;
pub mod typescript;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tera::{Context, Tera};
use tokio::fs;
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::core::{Error, Result};
use crate::generation::EmissionEngine;
use crate::output::{Artifact, write_artifacts};
pub use model::ApiModel;

pub const TYPINGS_FILE: &str = "typings.d.ts";
pub const INDEX_FILE: &str = "index.ts";
pub const BASE_FILE: &str = "base.ts";

const INTERFACE_TEMPLATE: &str = "interface.d.ts";
const SERVICE_TEMPLATE: &str = "service.ts";
const INDEX_TEMPLATE: &str = "index.ts";
const BASE_TEMPLATE: &str = "base.ts";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        INTERFACE_TEMPLATE,
        include_str!("../../templates/interface.d.ts.tera"),
    ),
    (
        SERVICE_TEMPLATE,
        include_str!("../../templates/service.ts.tera"),
    ),
    (INDEX_TEMPLATE, include_str!("../../templates/index.ts.tera")),
    (BASE_TEMPLATE, include_str!("../../templates/base.ts.tera")),
];

/// Default emission engine producing a fetch-based TypeScript SDK
#[derive(Debug, Clone, Default)]
pub struct ServiceGenerator;

impl ServiceGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Load built-in templates, then apply the overrides named by `config`
    pub async fn load_templates(&self, config: &CliConfig) -> Result<Tera> {
        let mut tera = Tera::default();
        for (name, content) in BUILTIN_TEMPLATES {
            tera.add_raw_template(name, content)
                .map_err(|e| Error::template(format!("Failed to add template '{name}': {e}")))?;
        }

        if let Some(dir) = &config.template_path {
            for name in [SERVICE_TEMPLATE, INDEX_TEMPLATE, BASE_TEMPLATE] {
                let candidate = dir.join(format!("{name}.tera"));
                if let Some(content) = read_override(&candidate).await? {
                    debug!(template = %candidate.display(), "Using custom template");
                    add_override(&mut tera, name, &content)?;
                }
            }
        }

        if let Some(path) = &config.interface_template_path {
            let content = read_override(path).await?.ok_or_else(|| {
                Error::template(format!(
                    "Interface template not found: {}",
                    path.display()
                ))
            })?;
            debug!(template = %path.display(), "Using custom interface template");
            add_override(&mut tera, INTERFACE_TEMPLATE, &content)?;
        }

        Ok(tera)
    }

    /// Render every file for `spec` without touching the filesystem
    pub fn render(&self, tera: &Tera, config: &CliConfig, spec: &JsonValue) -> Result<Vec<Artifact>> {
        let model = ApiModel::from_spec(spec, &config.namespace);
        let custom_transport = config.uses_custom_transport();
        let request_import = match config.request_lib.as_deref().map(str::trim) {
            Some(lib) if !lib.is_empty() => format!("./base.{lib}"),
            _ => "./base".to_string(),
        };
        let base_url = config
            .options
            .get("baseUrl")
            .and_then(JsonValue::as_str)
            .unwrap_or_default();

        let mut context = Context::new();
        context.insert("title", &model.title);
        context.insert("version", &model.version);
        context.insert("namespace", &config.namespace);
        context.insert("interfaces", &model.interfaces);
        context.insert("services", &model.services);
        context.insert("custom_transport", &custom_transport);
        context.insert("request_import", &request_import);
        context.insert("base_url", base_url);
        context.insert("options", &config.options);

        let dir = &config.sdk_dir;
        let mut artifacts = vec![Artifact::new(
            dir.join(TYPINGS_FILE),
            render_one(tera, INTERFACE_TEMPLATE, &context)?,
        )];

        for service in &model.services {
            let mut service_context = context.clone();
            service_context.insert("service", service);
            artifacts.push(Artifact::new(
                dir.join(format!("{}.ts", service.file_name)),
                render_one(tera, SERVICE_TEMPLATE, &service_context)?,
            ));
        }

        artifacts.push(Artifact::new(
            dir.join(INDEX_FILE),
            render_one(tera, INDEX_TEMPLATE, &context)?,
        ));

        if !custom_transport {
            artifacts.push(Artifact::new(
                dir.join(BASE_FILE),
                render_one(tera, BASE_TEMPLATE, &context)?,
            ));
        }

        Ok(artifacts)
    }
}

#[async_trait]
impl EmissionEngine for ServiceGenerator {
    async fn generate_files(&self, config: &CliConfig, spec: JsonValue) -> Result<Vec<PathBuf>> {
        let tera = self.load_templates(config).await?;
        let artifacts = self.render(&tera, config, &spec)?;
        write_artifacts(&artifacts).await?;

        info!(
            api = %config.api,
            sdk_dir = %config.sdk_dir.display(),
            files = artifacts.len(),
            "Generated service files"
        );
        Ok(artifacts.into_iter().map(|artifact| artifact.path).collect())
    }
}

async fn read_override(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn add_override(tera: &mut Tera, name: &str, content: &str) -> Result<()> {
    tera.add_raw_template(name, content)
        .map_err(|e| Error::template(format!("Failed to add template '{name}': {e}")))
}

fn render_one(tera: &Tera, name: &str, context: &Context) -> Result<String> {
    tera.render(name, context)
        .map_err(|e| Error::template(format!("Failed to render template '{name}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn spec() -> JsonValue {
        json!({
            "openapi": "3.0.0",
            "info": { "title": "Pets", "version": "1.0.0" },
            "paths": {
                "/v1/pets/{petId}": {
                    "get": {
                        "tags": ["pet"],
                        "operationId": "getPetById",
                        "parameters": [
                            { "in": "path", "name": "petId", "required": true, "schema": { "type": "integer" } },
                            { "in": "query", "name": "fields", "schema": { "type": "array", "items": { "type": "string" } } }
                        ],
                        "responses": {
                            "200": { "description": "ok", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
                        }
                    }
                },
                "/v1/pets": {
                    "post": {
                        "tags": ["pet"],
                        "operationId": "addPet",
                        "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } },
                        "responses": { "200": { "description": "ok" } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "required": ["name"],
                        "properties": { "name": { "type": "string" }, "id": { "type": "integer" } }
                    }
                }
            }
        })
    }

    fn config(dir: &Path) -> CliConfig {
        CliConfig::new("pets.json", dir)
    }

    #[tokio::test]
    async fn test_render_builtin_templates() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path());
        let generator = ServiceGenerator::new();
        let tera = generator.load_templates(&config).await.unwrap();
        let artifacts = generator.render(&tera, &config, &spec()).unwrap();

        let names: Vec<_> = artifacts
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["typings.d.ts", "pet.ts", "index.ts", "base.ts"]);

        let typings = &artifacts[0].content;
        assert!(typings.contains("declare namespace API {"));
        assert!(typings.contains("export interface Pet {"));
        assert!(typings.contains("name: string;"));
        assert!(typings.contains("id?: number;"));

        let service = &artifacts[1].content;
        assert!(service.contains("import { request } from './base';"));
        assert!(service.contains(
            "export function getPetById(params: { petId: number; fields?: string[]; }): Promise<API.Pet>"
        ));
        assert!(service.contains("url: `/v1/pets/${params['petId']}`"));
        assert!(service.contains("export function addPet(body: API.Pet): Promise<any>"));

        let index = &artifacts[2].content;
        assert!(index.contains("export * as pet from './pet';"));
    }

    #[tokio::test]
    async fn test_custom_transport_skips_base() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config(temp_dir.path());
        config.request_lib = Some("axios".to_string());
        let generator = ServiceGenerator::new();
        let tera = generator.load_templates(&config).await.unwrap();
        let artifacts = generator.render(&tera, &config, &spec()).unwrap();

        assert!(!artifacts.iter().any(|a| a.path.ends_with(BASE_FILE)));
        let service = artifacts
            .iter()
            .find(|a| a.path.ends_with("pet.ts"))
            .unwrap();
        assert!(service.content.contains("from './base.axios';"));
    }

    #[tokio::test]
    async fn test_template_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let templates = temp_dir.path().join("templates");
        std::fs::create_dir(&templates).unwrap();
        std::fs::write(templates.join("index.ts.tera"), "// {{ services | length }} services\n").unwrap();
        let interface = temp_dir.path().join("interface.tera");
        std::fs::write(&interface, "// {{ interfaces | length }} interfaces\n").unwrap();

        let mut config = config(&temp_dir.path().join("sdk"));
        config.template_path = Some(templates);
        config.interface_template_path = Some(interface);

        let generator = ServiceGenerator::new();
        let tera = generator.load_templates(&config).await.unwrap();
        let artifacts = generator.render(&tera, &config, &spec()).unwrap();

        assert_eq!(artifacts[0].content.trim_end(), "// 1 interfaces");
        let index = artifacts.iter().find(|a| a.path.ends_with(INDEX_FILE)).unwrap();
        assert_eq!(index.content.trim_end(), "// 1 services");
    }

    #[tokio::test]
    async fn test_missing_interface_template_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config(temp_dir.path());
        config.interface_template_path = Some(temp_dir.path().join("absent.tera"));
        let result = ServiceGenerator::new().load_templates(&config).await;
        assert!(matches!(result, Err(Error::Template(_))));
    }

    #[tokio::test]
    async fn test_generate_files_writes_to_sdk_dir() {
        let temp_dir = TempDir::new().unwrap();
        let sdk_dir = temp_dir.path().join("sdk");
        let written = ServiceGenerator::new()
            .generate_files(&config(&sdk_dir), spec())
            .await
            .unwrap();

        assert_eq!(written.len(), 4);
        assert!(sdk_dir.join(TYPINGS_FILE).exists());
        assert!(sdk_dir.join("pet.ts").exists());
        let base = std::fs::read_to_string(sdk_dir.join(BASE_FILE)).unwrap();
        assert!(base.contains("let baseURL = \"\";"));
    }
}
