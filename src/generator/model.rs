//! Render model extracted from a normalized OpenAPI document

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::typescript::{path_template, property_key, required_names, ts_type};
use crate::core::utils::{to_camel_case, to_identifier};
use crate::openapi::repair::HTTP_METHODS;

/// Service name used for operations without tags
pub const UNTAGGED_SERVICE: &str = "common";

const RESERVED_FILE_NAMES: &[&str] = &["index", "typings", "base"];

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
];

/// One entry of `typings.d.ts`
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceDef {
    pub name: String,
    pub description: Option<String>,
    /// `interface` or `alias`
    pub kind: &'static str,
    pub properties: Vec<PropertyDef>,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyDef {
    pub name: String,
    pub ts_type: String,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamDef {
    pub name: String,
    pub key: String,
    pub ts_type: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationDef {
    pub function_name: String,
    pub method: String,
    pub raw_path: String,
    pub path: String,
    pub summary: String,
    pub deprecated: bool,
    pub has_params: bool,
    pub params_type: String,
    pub query_params: Vec<ParamDef>,
    pub header_params: Vec<ParamDef>,
    pub body_type: Option<String>,
    pub body_media: Option<String>,
    pub response_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDef {
    pub name: String,
    pub file_name: String,
    pub operations: Vec<OperationDef>,
}

/// Everything the templates need, in a deterministic order
#[derive(Debug, Clone, Serialize)]
pub struct ApiModel {
    pub title: String,
    pub version: String,
    pub interfaces: Vec<InterfaceDef>,
    pub services: Vec<ServiceDef>,
}

impl ApiModel {
    pub fn from_spec(spec: &JsonValue, namespace: &str) -> Self {
        let info = spec.get("info");
        let text = |key: &str| {
            info.and_then(|i| i.get(key))
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            title: text("title"),
            version: text("version"),
            interfaces: interfaces(spec, namespace),
            services: services(spec, namespace),
        }
    }
}

fn description(value: &JsonValue) -> Option<String> {
    value
        .get("description")
        .and_then(JsonValue::as_str)
        .map(|d| d.replace("*/", "* /").replace('\n', " "))
        .filter(|d| !d.trim().is_empty())
}

fn interfaces(spec: &JsonValue, namespace: &str) -> Vec<InterfaceDef> {
    let Some(schemas) = spec
        .pointer("/components/schemas")
        .and_then(JsonValue::as_object)
    else {
        return Vec::new();
    };

    schemas
        .iter()
        .map(|(name, schema)| {
            let properties = schema.get("properties").and_then(JsonValue::as_object);
            let is_interface = properties.is_some_and(|p| !p.is_empty())
                && schema.get("allOf").is_none()
                && schema.get("oneOf").is_none()
                && schema.get("anyOf").is_none();

            if is_interface {
                let required = schema
                    .as_object()
                    .map(required_names)
                    .unwrap_or_default();
                let properties = properties
                    .map(|props| {
                        props
                            .iter()
                            .map(|(prop, prop_schema)| PropertyDef {
                                name: property_key(prop),
                                ts_type: ts_type(prop_schema, namespace),
                                required: required.contains(&prop.as_str()),
                                description: description(prop_schema),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                InterfaceDef {
                    name: to_identifier(name),
                    description: description(schema),
                    kind: "interface",
                    properties,
                    alias: String::new(),
                }
            } else {
                InterfaceDef {
                    name: to_identifier(name),
                    description: description(schema),
                    kind: "alias",
                    properties: Vec::new(),
                    alias: ts_type(schema, namespace),
                }
            }
        })
        .collect()
}

/// Follow one local `$ref` into the document, if present
fn resolve<'a>(spec: &'a JsonValue, value: &'a JsonValue) -> &'a JsonValue {
    value
        .get("$ref")
        .and_then(JsonValue::as_str)
        .and_then(|reference| reference.strip_prefix('#'))
        .and_then(|pointer| spec.pointer(pointer))
        .unwrap_or(value)
}

fn services(spec: &JsonValue, namespace: &str) -> Vec<ServiceDef> {
    let mut grouped: BTreeMap<String, Vec<OperationDef>> = BTreeMap::new();
    let mut used_names: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    let Some(paths) = spec.get("paths").and_then(JsonValue::as_object) else {
        return Vec::new();
    };

    for (path, item) in paths {
        let Some(item_map) = item.as_object() else {
            continue;
        };
        let shared = item_map.get("parameters");
        for method in HTTP_METHODS {
            let Some(operation) = item_map.get(*method).filter(|op| op.is_object()) else {
                continue;
            };
            let tag = operation
                .get("tags")
                .and_then(JsonValue::as_array)
                .and_then(|tags| tags.first())
                .and_then(JsonValue::as_str)
                .unwrap_or(UNTAGGED_SERVICE);
            let service = service_name(tag);

            let names = used_names.entry(service.clone()).or_default();
            let function_name = unique_function_name(operation, method, path, names);

            let op = build_operation(spec, namespace, path, method, operation, shared, function_name);
            grouped.entry(service).or_default().push(op);
        }
    }

    grouped
        .into_iter()
        .map(|(name, operations)| {
            let file_name = if RESERVED_FILE_NAMES.contains(&name.as_str()) {
                format!("{name}Service")
            } else {
                name.clone()
            };
            ServiceDef {
                name,
                file_name,
                operations,
            }
        })
        .collect()
}

fn service_name(tag: &str) -> String {
    let name = to_camel_case(tag);
    let name = if name.is_empty() {
        UNTAGGED_SERVICE.to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    };
    if RESERVED_WORDS.contains(&name.as_str()) {
        format!("{name}Api")
    } else {
        name
    }
}

fn unique_function_name(
    operation: &JsonValue,
    method: &str,
    path: &str,
    used: &mut BTreeSet<String>,
) -> String {
    let base = operation
        .get("operationId")
        .and_then(JsonValue::as_str)
        .map(to_camel_case)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| to_camel_case(&format!("{method} {path}")));
    let base = if base.starts_with(|c: char| c.is_ascii_digit())
        || RESERVED_WORDS.contains(&base.as_str())
    {
        format!("{method}{}", to_identifier(&base))
    } else {
        base
    };

    let mut name = base.clone();
    let mut suffix = 2;
    while !used.insert(name.clone()) {
        name = format!("{base}{suffix}");
        suffix += 1;
    }
    name
}

fn build_operation(
    spec: &JsonValue,
    namespace: &str,
    path: &str,
    method: &str,
    operation: &JsonValue,
    shared: Option<&JsonValue>,
    function_name: String,
) -> OperationDef {
    // Operation-level parameters override path-level ones with the same name and location.
    let mut merged: BTreeMap<(String, String), &JsonValue> = BTreeMap::new();
    let mut order: Vec<(String, String)> = Vec::new();
    for source in [shared, operation.get("parameters")].into_iter().flatten() {
        for param in source.as_array().into_iter().flatten() {
            let param = resolve(spec, param);
            let (Some(name), Some(location)) = (
                param.get("name").and_then(JsonValue::as_str),
                param.get("in").and_then(JsonValue::as_str),
            ) else {
                continue;
            };
            let key = (location.to_string(), name.to_string());
            if merged.insert(key.clone(), param).is_none() {
                order.push(key);
            }
        }
    }

    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut header_params = Vec::new();
    for key in &order {
        let Some(param) = merged.get(key) else {
            continue;
        };
        let def = ParamDef {
            name: key.1.clone(),
            key: property_key(&key.1),
            ts_type: param
                .get("schema")
                .map_or_else(|| "any".to_string(), |schema| ts_type(schema, namespace)),
            required: key.0 == "path"
                || param.get("required").and_then(JsonValue::as_bool) == Some(true),
        };
        match key.0.as_str() {
            "path" => path_params.push(def),
            "query" => query_params.push(def),
            "header" => header_params.push(def),
            _ => {}
        }
    }

    let params_type = {
        let fields: Vec<String> = path_params
            .iter()
            .chain(&query_params)
            .chain(&header_params)
            .map(|p| {
                let optional = if p.required { "" } else { "?" };
                format!("{}{optional}: {}", p.key, p.ts_type)
            })
            .collect();
        if fields.is_empty() {
            String::new()
        } else {
            format!("{{ {}; }}", fields.join("; "))
        }
    };

    let (body_type, body_media) = match operation.get("requestBody").map(|b| resolve(spec, b)) {
        Some(body) => match pick_media(body) {
            Some((media, schema)) => (
                Some(schema.map_or_else(|| "any".to_string(), |s| ts_type(s, namespace))),
                Some(media),
            ),
            None => (Some("any".to_string()), None),
        },
        None => (None, None),
    };

    let response_type = operation
        .get("responses")
        .and_then(JsonValue::as_object)
        .and_then(success_response)
        .map(|response| resolve(spec, response))
        .and_then(pick_media)
        .and_then(|(_, schema)| schema)
        .map_or_else(|| "any".to_string(), |schema| ts_type(schema, namespace));

    let summary = operation
        .get("summary")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .or_else(|| description(operation))
        .unwrap_or_default()
        .replace("*/", "* /")
        .replace('\n', " ");

    OperationDef {
        function_name,
        method: method.to_string(),
        raw_path: path.to_string(),
        path: path_template(path),
        summary,
        deprecated: operation.get("deprecated").and_then(JsonValue::as_bool) == Some(true),
        has_params: !params_type.is_empty(),
        params_type,
        query_params,
        header_params,
        body_type,
        body_media,
        response_type,
    }
}

fn success_response(responses: &Map<String, JsonValue>) -> Option<&JsonValue> {
    ["200", "201"]
        .iter()
        .find_map(|code| responses.get(*code))
        .or_else(|| {
            responses
                .iter()
                .find(|(code, _)| code.starts_with('2'))
                .map(|(_, response)| response)
        })
        .or_else(|| responses.get("default"))
}

/// Preferred media type of a request body or response and its schema
fn pick_media(holder: &JsonValue) -> Option<(String, Option<&JsonValue>)> {
    let content = holder.get("content").and_then(JsonValue::as_object)?;
    let (media, entry) = content
        .iter()
        .find(|(media, _)| media.contains("json"))
        .or_else(|| content.iter().next())?;
    Some((media.clone(), entry.get("schema")))
}
