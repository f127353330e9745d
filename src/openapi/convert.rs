//! Swagger 2.0 to OpenAPI 3.0 conversion

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue, json};

use super::repair::HTTP_METHODS;
use crate::core::{Error, Result};

/// Version written into converted documents
pub const CONVERTED_VERSION: &str = "3.0.0";

const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Converts a repaired Swagger 2.0 document into an equivalent OpenAPI 3.x one
#[async_trait]
pub trait SwaggerConverter: Send + Sync {
    async fn convert(&self, swagger: JsonValue) -> Result<JsonValue>;
}

/// In-process converter covering the parts of Swagger 2.0 used by SDK generation
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConverter;

#[async_trait]
impl SwaggerConverter for BuiltinConverter {
    async fn convert(&self, swagger: JsonValue) -> Result<JsonValue> {
        let JsonValue::Object(mut source) = swagger else {
            return Err(Error::Conversion("Swagger document is not an object".to_string()));
        };
        rewrite_refs(&mut source);

        let consumes = media_types(source.get("consumes"));
        let produces = media_types(source.get("produces"));

        let mut target = Map::new();
        target.insert("openapi".to_string(), json!(CONVERTED_VERSION));
        for key in ["info", "tags", "externalDocs", "security"] {
            if let Some(value) = source.remove(key) {
                target.insert(key.to_string(), value);
            }
        }

        let servers = build_servers(&source);
        if !servers.is_empty() {
            target.insert("servers".to_string(), JsonValue::Array(servers));
        }

        match source.remove("paths") {
            Some(JsonValue::Object(paths)) => {
                let converted = paths
                    .into_iter()
                    .map(|(path, item)| (path, convert_path_item(item, &consumes, &produces)))
                    .collect();
                target.insert("paths".to_string(), JsonValue::Object(converted));
            }
            Some(other) => {
                target.insert("paths".to_string(), other);
            }
            None => {}
        }

        let components = build_components(&mut source, &produces);
        if !components.is_empty() {
            target.insert("components".to_string(), JsonValue::Object(components));
        }

        for (key, value) in source {
            if key.starts_with("x-") {
                target.insert(key, value);
            }
        }

        Ok(JsonValue::Object(target))
    }
}

fn media_types(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(JsonValue::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn first_media_type(types: &[String]) -> &str {
    types.first().map_or(DEFAULT_MEDIA_TYPE, String::as_str)
}

/// Rewrites every `$ref` to its components location
fn rewrite_refs(map: &mut Map<String, JsonValue>) {
    for (key, value) in map.iter_mut() {
        match value {
            JsonValue::String(reference) if key == "$ref" => {
                *reference = convert_ref(reference.as_str());
            }
            _ => rewrite_value_refs(value),
        }
    }
}

fn rewrite_value_refs(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => rewrite_refs(map),
        JsonValue::Array(items) => items.iter_mut().for_each(rewrite_value_refs),
        _ => {}
    }
}

fn convert_ref(reference: &str) -> String {
    const MOVES: &[(&str, &str)] = &[
        ("#/definitions/", "#/components/schemas/"),
        ("#/parameters/", "#/components/parameters/"),
        ("#/responses/", "#/components/responses/"),
    ];
    MOVES
        .iter()
        .find_map(|(from, to)| {
            reference
                .strip_prefix(from)
                .map(|name| format!("{to}{name}"))
        })
        .unwrap_or_else(|| reference.to_string())
}

fn build_servers(source: &Map<String, JsonValue>) -> Vec<JsonValue> {
    let base_path = source
        .get("basePath")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    match source.get("host").and_then(JsonValue::as_str) {
        Some(host) => {
            let schemes = media_types(source.get("schemes"));
            let schemes = if schemes.is_empty() {
                vec!["https".to_string()]
            } else {
                schemes
            };
            schemes
                .iter()
                .map(|scheme| json!({ "url": format!("{scheme}://{host}{base_path}") }))
                .collect()
        }
        None if !base_path.is_empty() => vec![json!({ "url": base_path })],
        None => Vec::new(),
    }
}

fn convert_path_item(item: JsonValue, consumes: &[String], produces: &[String]) -> JsonValue {
    let item = match item {
        JsonValue::Object(map) => map,
        other => return other,
    };
    let shared_params = item
        .get("parameters")
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default();

    let mut converted = Map::new();
    for (key, value) in item {
        if HTTP_METHODS.contains(&key.as_str()) {
            converted.insert(key, convert_operation(value, consumes, produces));
        } else if key == "parameters" {
            // Body and form parameters move into each operation's request body.
            let params: Vec<JsonValue> = shared_params
                .iter()
                .filter(|p| !is_payload_parameter(p))
                .cloned()
                .map(convert_parameter)
                .collect();
            if !params.is_empty() {
                converted.insert(key, JsonValue::Array(params));
            }
        } else {
            converted.insert(key, value);
        }
    }

    let payload: Vec<JsonValue> = shared_params
        .into_iter()
        .filter(is_payload_parameter)
        .collect();
    if !payload.is_empty() {
        for operation in converted
            .iter_mut()
            .filter(|(key, _)| HTTP_METHODS.contains(&key.as_str()))
            .filter_map(|(_, op)| op.as_object_mut())
        {
            if !operation.contains_key("requestBody") {
                if let Some(body) = request_body(&payload, consumes) {
                    operation.insert("requestBody".to_string(), body);
                }
            }
        }
    }

    JsonValue::Object(converted)
}

fn is_payload_parameter(parameter: &JsonValue) -> bool {
    matches!(
        parameter.get("in").and_then(JsonValue::as_str),
        Some("body" | "formData")
    )
}

fn convert_operation(operation: JsonValue, consumes: &[String], produces: &[String]) -> JsonValue {
    let mut operation = match operation {
        JsonValue::Object(map) => map,
        other => return other,
    };
    let consumes = match media_types(operation.remove("consumes").as_ref()) {
        own if own.is_empty() => consumes.to_vec(),
        own => own,
    };
    let produces = match media_types(operation.remove("produces").as_ref()) {
        own if own.is_empty() => produces.to_vec(),
        own => own,
    };
    operation.remove("schemes");

    if let Some(JsonValue::Array(params)) = operation.remove("parameters") {
        let (payload, others): (Vec<_>, Vec<_>) =
            params.into_iter().partition(is_payload_parameter);
        let others: Vec<JsonValue> = others.into_iter().map(convert_parameter).collect();
        if !others.is_empty() {
            operation.insert("parameters".to_string(), JsonValue::Array(others));
        }
        if let Some(body) = request_body(&payload, &consumes) {
            operation.insert("requestBody".to_string(), body);
        }
    }

    if let Some(JsonValue::Object(responses)) = operation.remove("responses") {
        let responses = responses
            .into_iter()
            .map(|(code, response)| (code, convert_response(response, &produces)))
            .collect();
        operation.insert("responses".to_string(), JsonValue::Object(responses));
    }

    JsonValue::Object(operation)
}

/// Keys that describe the value of a non-body Swagger parameter
const SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "items",
    "enum",
    "default",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "multipleOf",
    "x-nullable",
];

fn convert_parameter(parameter: JsonValue) -> JsonValue {
    let mut param = match parameter {
        JsonValue::Object(map) => map,
        other => return other,
    };
    if param.contains_key("$ref") {
        return JsonValue::Object(param);
    }
    let schema = take_schema(&mut param);
    if let Some(format) = param.remove("collectionFormat") {
        match format.as_str() {
            Some("multi") => {
                param.insert("style".to_string(), json!("form"));
                param.insert("explode".to_string(), json!(true));
            }
            Some("pipes") => {
                param.insert("style".to_string(), json!("pipeDelimited"));
            }
            Some("ssv") => {
                param.insert("style".to_string(), json!("spaceDelimited"));
            }
            _ => {
                param.insert("explode".to_string(), json!(false));
            }
        }
    }
    param.remove("allowEmptyValue");
    if !schema.is_empty() {
        param.insert("schema".to_string(), JsonValue::Object(schema));
    }
    JsonValue::Object(param)
}

fn take_schema(param: &mut Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut schema = Map::new();
    for key in SCHEMA_KEYS {
        if let Some(value) = param.remove(*key) {
            let key = if *key == "x-nullable" { "nullable" } else { *key };
            schema.insert(key.to_string(), value);
        }
    }
    if schema.get("type").and_then(JsonValue::as_str) == Some("file") {
        schema.insert("type".to_string(), json!("string"));
        schema.insert("format".to_string(), json!("binary"));
    }
    schema
}

fn request_body(payload: &[JsonValue], consumes: &[String]) -> Option<JsonValue> {
    if let Some(body) = payload
        .iter()
        .find(|p| p.get("in").and_then(JsonValue::as_str) == Some("body"))
    {
        if body.get("$ref").is_some() {
            return None;
        }
        let schema = body.get("schema").cloned().unwrap_or_else(|| json!({}));
        let content: Map<String, JsonValue> = if consumes.is_empty() {
            [(DEFAULT_MEDIA_TYPE.to_string(), json!({ "schema": schema }))]
                .into_iter()
                .collect()
        } else {
            consumes
                .iter()
                .map(|media| (media.clone(), json!({ "schema": schema.clone() })))
                .collect()
        };
        let mut request = Map::new();
        if let Some(description) = body.get("description") {
            request.insert("description".to_string(), description.clone());
        }
        request.insert("content".to_string(), JsonValue::Object(content));
        if body.get("required").and_then(JsonValue::as_bool) == Some(true) {
            request.insert("required".to_string(), json!(true));
        }
        return Some(JsonValue::Object(request));
    }

    let form: Vec<&JsonValue> = payload
        .iter()
        .filter(|p| p.get("in").and_then(JsonValue::as_str) == Some("formData"))
        .collect();
    if form.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut has_file = false;
    for field in form {
        let Some(name) = field.get("name").and_then(JsonValue::as_str) else {
            continue;
        };
        let mut field = field.as_object().cloned().unwrap_or_default();
        has_file |= field.get("type").and_then(JsonValue::as_str) == Some("file");
        let mut schema = take_schema(&mut field);
        if let Some(description) = field.get("description") {
            schema.insert("description".to_string(), description.clone());
        }
        if field.get("required").and_then(JsonValue::as_bool) == Some(true) {
            required.push(json!(name));
        }
        properties.insert(name.to_string(), JsonValue::Object(schema));
    }

    let media = consumes
        .iter()
        .find(|m| m.starts_with("multipart/") || m.starts_with("application/x-www-form"))
        .cloned()
        .unwrap_or_else(|| {
            if has_file {
                "multipart/form-data".to_string()
            } else {
                "application/x-www-form-urlencoded".to_string()
            }
        });

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = JsonValue::Array(required);
    }
    Some(json!({ "content": { media: { "schema": schema } } }))
}

fn convert_response(response: JsonValue, produces: &[String]) -> JsonValue {
    let mut res = match response {
        JsonValue::Object(map) => map,
        other => return other,
    };
    if res.contains_key("$ref") {
        return JsonValue::Object(res);
    }
    res.remove("examples");
    if let Some(schema) = res.remove("schema") {
        let media = first_media_type(produces);
        res.insert(
            "content".to_string(),
            json!({ media: { "schema": schema } }),
        );
    }
    if let Some(JsonValue::Object(headers)) = res.remove("headers") {
        let headers: Map<String, JsonValue> = headers
            .into_iter()
            .map(|(name, header)| {
                let header = match header {
                    JsonValue::Object(mut header) => {
                        let schema = take_schema(&mut header);
                        header.insert("schema".to_string(), JsonValue::Object(schema));
                        JsonValue::Object(header)
                    }
                    other => other,
                };
                (name, header)
            })
            .collect();
        res.insert("headers".to_string(), JsonValue::Object(headers));
    }
    JsonValue::Object(res)
}

fn build_components(
    source: &mut Map<String, JsonValue>,
    produces: &[String],
) -> Map<String, JsonValue> {
    let mut components = Map::new();

    if let Some(definitions) = source.remove("definitions") {
        components.insert("schemas".to_string(), definitions);
    }

    if let Some(JsonValue::Object(parameters)) = source.remove("parameters") {
        let (bodies, others): (Map<String, JsonValue>, Map<String, JsonValue>) = parameters
            .into_iter()
            .partition(|(_, p)| is_payload_parameter(p));
        if !others.is_empty() {
            let others = others
                .into_iter()
                .map(|(name, p)| (name, convert_parameter(p)))
                .collect();
            components.insert("parameters".to_string(), JsonValue::Object(others));
        }
        if !bodies.is_empty() {
            let bodies: Map<String, JsonValue> = bodies
                .into_iter()
                .filter_map(|(name, p)| request_body(&[p], &[]).map(|body| (name, body)))
                .collect();
            components.insert("requestBodies".to_string(), JsonValue::Object(bodies));
        }
    }

    if let Some(JsonValue::Object(responses)) = source.remove("responses") {
        let responses = responses
            .into_iter()
            .map(|(name, r)| (name, convert_response(r, produces)))
            .collect();
        components.insert("responses".to_string(), JsonValue::Object(responses));
    }

    if let Some(JsonValue::Object(schemes)) = source.remove("securityDefinitions") {
        let schemes = schemes
            .into_iter()
            .map(|(name, scheme)| (name, convert_security_scheme(scheme)))
            .collect();
        components.insert("securitySchemes".to_string(), JsonValue::Object(schemes));
    }

    components
}

fn convert_security_scheme(scheme: JsonValue) -> JsonValue {
    let kind = scheme.get("type").and_then(JsonValue::as_str);
    match kind {
        Some("basic") => {
            let mut converted = json!({ "type": "http", "scheme": "basic" });
            if let Some(description) = scheme.get("description") {
                converted["description"] = description.clone();
            }
            converted
        }
        Some("oauth2") => {
            let flow = match scheme.get("flow").and_then(JsonValue::as_str) {
                Some("accessCode") => "authorizationCode",
                Some("application") => "clientCredentials",
                Some("password") => "password",
                _ => "implicit",
            };
            let mut details = Map::new();
            for key in ["authorizationUrl", "tokenUrl"] {
                if let Some(url) = scheme.get(key) {
                    details.insert(key.to_string(), url.clone());
                }
            }
            details.insert(
                "scopes".to_string(),
                scheme.get("scopes").cloned().unwrap_or_else(|| json!({})),
            );
            let mut converted = json!({ "type": "oauth2", "flows": { flow: details } });
            if let Some(description) = scheme.get("description") {
                converted["description"] = description.clone();
            }
            converted
        }
        _ => scheme,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn petstore() -> JsonValue {
        json!({
            "swagger": "2.0",
            "info": { "title": "Petstore", "version": "1.0.0" },
            "host": "petstore.example.com",
            "basePath": "/v2",
            "schemes": ["https"],
            "consumes": ["application/json"],
            "produces": ["application/json"],
            "paths": {
                "/pet/{petId}": {
                    "parameters": [{ "in": "path", "name": "petId", "required": true, "type": "integer" }],
                    "get": {
                        "tags": ["pet"],
                        "operationId": "getPetById",
                        "responses": {
                            "200": { "description": "ok", "schema": { "$ref": "#/definitions/Pet" } }
                        }
                    },
                    "post": {
                        "operationId": "updatePetWithForm",
                        "consumes": ["application/x-www-form-urlencoded"],
                        "parameters": [
                            { "in": "formData", "name": "name", "type": "string", "required": true },
                            { "in": "formData", "name": "status", "type": "string" }
                        ],
                        "responses": { "405": { "description": "Invalid input" } }
                    }
                },
                "/pet": {
                    "post": {
                        "operationId": "addPet",
                        "parameters": [
                            { "in": "body", "name": "body", "required": true, "schema": { "$ref": "#/definitions/Pet" } },
                            { "in": "query", "name": "tags", "type": "array", "items": { "type": "string" }, "collectionFormat": "multi" }
                        ],
                        "responses": { "200": { "description": "ok" } }
                    }
                }
            },
            "definitions": {
                "Pet": {
                    "type": "object",
                    "properties": { "category": { "$ref": "#/definitions/Category" } }
                },
                "Category": { "type": "object" }
            },
            "securityDefinitions": {
                "basicAuth": { "type": "basic" },
                "petstore_auth": {
                    "type": "oauth2",
                    "flow": "implicit",
                    "authorizationUrl": "https://petstore.example.com/oauth/dialog",
                    "scopes": { "write:pets": "modify pets" }
                }
            },
            "x-generator": "hand"
        })
    }

    #[tokio::test]
    async fn test_convert_top_level() {
        let converted = BuiltinConverter.convert(petstore()).await.unwrap();
        assert_eq!(converted["openapi"], CONVERTED_VERSION);
        assert_eq!(converted["info"]["title"], "Petstore");
        assert_eq!(
            converted["servers"][0]["url"],
            "https://petstore.example.com/v2"
        );
        assert_eq!(converted["x-generator"], "hand");
        assert!(converted.get("swagger").is_none());
        assert!(converted.get("definitions").is_none());
        assert_eq!(
            converted["components"]["schemas"]["Pet"]["properties"]["category"]["$ref"],
            "#/components/schemas/Category"
        );
    }

    #[tokio::test]
    async fn test_convert_operations() {
        let converted = BuiltinConverter.convert(petstore()).await.unwrap();
        let paths = &converted["paths"];

        let get = &paths["/pet/{petId}"]["get"];
        assert_eq!(
            get["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Pet"
        );
        assert_eq!(paths["/pet/{petId}"]["parameters"][0]["schema"]["type"], "integer");
        assert!(paths["/pet/{petId}"]["parameters"][0].get("type").is_none());

        let form = &paths["/pet/{petId}"]["post"]["requestBody"]["content"]
            ["application/x-www-form-urlencoded"]["schema"];
        assert_eq!(form["properties"]["name"]["type"], "string");
        assert_eq!(form["required"], json!(["name"]));

        let add = &paths["/pet"]["post"];
        assert_eq!(add["requestBody"]["required"], true);
        assert_eq!(
            add["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Pet"
        );
        assert_eq!(add["parameters"].as_array().unwrap().len(), 1);
        assert_eq!(add["parameters"][0]["style"], "form");
        assert_eq!(add["parameters"][0]["schema"]["items"]["type"], "string");
    }

    #[tokio::test]
    async fn test_convert_security_schemes() {
        let converted = BuiltinConverter.convert(petstore()).await.unwrap();
        let schemes = &converted["components"]["securitySchemes"];
        assert_eq!(schemes["basicAuth"], json!({ "type": "http", "scheme": "basic" }));
        assert_eq!(
            schemes["petstore_auth"]["flows"]["implicit"]["scopes"]["write:pets"],
            "modify pets"
        );
    }

    #[tokio::test]
    async fn test_convert_rejects_non_object() {
        let result = BuiltinConverter.convert(json!(["swagger"])).await;
        assert!(matches!(result, Err(Error::Conversion(_))));
    }

    #[test]
    fn test_convert_ref() {
        assert_eq!(convert_ref("#/definitions/Pet"), "#/components/schemas/Pet");
        assert_eq!(convert_ref("#/parameters/limit"), "#/components/parameters/limit");
        assert_eq!(convert_ref("other.json#/Pet"), "other.json#/Pet");
    }
}
