//! End-to-end generation through HTTP sources, configuration files and the TypeScript engine

use std::fs;
use std::path::Path;

use oas_sdkgen::config::{CliConfig, ConfigSource};
use oas_sdkgen::generation::GenerationOrchestrator;
use oas_sdkgen::Error;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn petstore_swagger() -> Value {
    json!({
        "swagger": "2.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "host": "petstore.example.com",
        "basePath": "/v1",
        "schemes": ["https"],
        "paths": {
            "/pets": {
                "get": {
                    "tags": ["pets"],
                    "operationId": "listPets",
                    "parameters": [
                        { "name": "limit", "in": "query", "type": "integer" }
                    ],
                    "responses": {
                        "200": {
                            "description": "A list of pets",
                            "schema": { "type": "array", "items": { "$ref": "#/definitions/Pet" } }
                        }
                    }
                },
                "post": {
                    "tags": ["pets"],
                    "operationId": "createPet",
                    "parameters": [
                        { "in": "body", "schema": { "$ref": "#/definitions/Pet" } }
                    ],
                    "responses": { "201": { "description": "Created" } }
                }
            },
            "/pets/{petId}": {
                "get": {
                    "tags": ["pets"],
                    "operationId": "showPetById",
                    "parameters": [
                        { "name": "petId", "in": "path", "type": "string" }
                    ],
                    "responses": {
                        "200": { "description": "A pet", "schema": { "$ref": "#/definitions/Pet" } }
                    }
                }
            }
        },
        "definitions": {
            "Pet": {
                "type": "object",
                "required": ["id", "name"],
                "properties": {
                    "id": { "type": "integer", "format": "int64" },
                    "name": { "type": "string" },
                    "tag": { "type": "string" }
                }
            }
        }
    })
}

async fn serve(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[tokio::test]
async fn test_swagger_over_http_generates_typescript() {
    let server = MockServer::start().await;
    serve(&server, "/swagger.json", petstore_swagger()).await;
    let temp_dir = TempDir::new().unwrap();
    let sdk_dir = temp_dir.path().join("service");

    let mut config = CliConfig::new(format!("{}/swagger.json", server.uri()), &sdk_dir);
    config.save_openapi_data = true;

    let reports = GenerationOrchestrator::with_defaults()
        .unwrap()
        .generate(vec![ConfigSource::from(config)])
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);

    let normalized: Value = serde_json::from_str(&read(&sdk_dir, "oas.json")).unwrap();
    assert_eq!(normalized["openapi"], "3.0.0");
    assert!(normalized["paths"].get("/v1/pets").is_some());
    assert!(normalized["paths"].get("/pets").is_none());
    assert_eq!(
        normalized["components"]["schemas"]["Pet"]["properties"]["id"]["type"],
        "integer"
    );

    let origin: Value = serde_json::from_str(&read(&sdk_dir, "origin.json")).unwrap();
    assert_eq!(origin, petstore_swagger());

    let typings = read(&sdk_dir, "typings.d.ts");
    assert!(typings.contains("export interface Pet {"));
    assert!(typings.contains("tag?: string;"));

    let service = read(&sdk_dir, "pets.ts");
    assert!(service.contains("export function listPets(params: { limit?: number; }): Promise<API.Pet[]>"));
    assert!(service.contains("export function createPet(body: API.Pet): Promise<any>"));
    assert!(service.contains("url: `/v1/pets/${params['petId']}`"));

    assert!(read(&sdk_dir, "index.ts").contains("export * as pets from './pets';"));
    assert!(sdk_dir.join("base.ts").exists());
}

#[tokio::test]
async fn test_malformed_sibling_rejects_without_blocking_others() {
    let server = MockServer::start().await;
    serve(&server, "/good.json", petstore_swagger()).await;
    serve(&server, "/bad.json", json!({ "swagger": "2.0", "info": { "title": "Bad" } })).await;
    let temp_dir = TempDir::new().unwrap();
    let good_dir = temp_dir.path().join("good");
    let bad_dir = temp_dir.path().join("bad");
    let bad_api = format!("{}/bad.json", server.uri());

    let result = GenerationOrchestrator::with_defaults()
        .unwrap()
        .generate(vec![
            ConfigSource::from(CliConfig::new(format!("{}/good.json", server.uri()), &good_dir)),
            ConfigSource::from(CliConfig::new(bad_api.clone(), &bad_dir)),
        ])
        .await;

    match result {
        Err(Error::Format { api, .. }) => assert_eq!(api, bad_api),
        other => panic!("Expected Format error, got {other:?}"),
    }
    for name in ["typings.d.ts", "pets.ts", "index.ts", "base.ts"] {
        assert!(good_dir.join(name).exists(), "{name} missing");
    }
    assert!(!bad_dir.exists());
}

#[tokio::test]
async fn test_http_error_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let api = format!("{}/missing.json", server.uri());

    let result = GenerationOrchestrator::with_defaults()
        .unwrap()
        .generate(vec![ConfigSource::from(CliConfig::new(api.clone(), temp_dir.path()))])
        .await;

    match result {
        Err(Error::Fetch { api: failed, message }) => {
            assert_eq!(failed, api);
            assert!(message.contains("404"));
        }
        other => panic!("Expected Fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_configuration_file_with_custom_transport() {
    let temp_dir = TempDir::new().unwrap();
    let spec_path = temp_dir.path().join("petstore.json");
    fs::write(&spec_path, petstore_swagger().to_string()).unwrap();

    let sdk_dir = temp_dir.path().join("sdk");
    fs::create_dir(&sdk_dir).unwrap();
    fs::write(sdk_dir.join("base.axios.ts"), "// user transport").unwrap();
    fs::write(sdk_dir.join("old.ts"), "// stale").unwrap();
    fs::write(sdk_dir.join("keep.ts"), "// kept").unwrap();
    fs::write(sdk_dir.join("README.md"), "notes").unwrap();

    let config_path = temp_dir.path().join("sdk.config.yaml");
    fs::write(
        &config_path,
        format!(
            "default:\n  - api: {}\n    sdkDir: {}\n    requestLib: axios\n    ignoreDelete: [keep.ts]\n",
            spec_path.display(),
            sdk_dir.display()
        ),
    )
    .unwrap();

    let reports = GenerationOrchestrator::with_defaults()
        .unwrap()
        .generate(vec![ConfigSource::from(config_path)])
        .await
        .unwrap();

    assert_eq!(reports[0].removed, vec![sdk_dir.join("old.ts")]);
    assert_eq!(read(&sdk_dir, "base.axios.ts"), "// user transport");
    assert_eq!(read(&sdk_dir, "keep.ts"), "// kept");
    assert!(sdk_dir.join("README.md").exists());
    assert!(!sdk_dir.join("base.ts").exists());
    assert!(read(&sdk_dir, "pets.ts").contains("from './base.axios';"));
}

#[tokio::test]
async fn test_custom_engine_receives_normalized_document() {
    use async_trait::async_trait;
    use oas_sdkgen::EmissionEngine;
    use oas_sdkgen::openapi::{CompositeSpecFetcher, SchemaNormalizer};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct VersionEngine;

    #[async_trait]
    impl EmissionEngine for VersionEngine {
        async fn generate_files(
            &self,
            config: &CliConfig,
            spec: Value,
        ) -> oas_sdkgen::Result<Vec<PathBuf>> {
            let path = config.sdk_dir.join("version.txt");
            tokio::fs::write(&path, spec["openapi"].as_str().unwrap_or_default()).await?;
            Ok(vec![path])
        }
    }

    let server = MockServer::start().await;
    serve(&server, "/swagger.json", petstore_swagger()).await;
    let temp_dir = TempDir::new().unwrap();

    let orchestrator = GenerationOrchestrator::new(
        Arc::new(CompositeSpecFetcher::new().unwrap()),
        SchemaNormalizer::default(),
        Arc::new(VersionEngine),
    );
    orchestrator
        .generate(vec![ConfigSource::from(CliConfig::new(
            format!("{}/swagger.json", server.uri()),
            temp_dir.path(),
        ))])
        .await
        .unwrap();

    assert_eq!(read(temp_dir.path(), "version.txt"), "3.0.0");
}
