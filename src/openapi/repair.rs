//! Structural repairs for specification documents found in the wild.
//!
//! Repairs patch known malformations in place. They never create `paths` or
//! `info`: a document missing either must still fail validation afterwards.

use serde_json::{Map, Value as JsonValue, json};

/// HTTP methods that may key an operation inside a path item
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Patches known malformations of Swagger 2.0 and OpenAPI 3.x documents
pub trait SpecRepair: Send + Sync {
    /// Repair a Swagger 2.0 document before conversion
    fn repair_swagger(&self, spec: &mut JsonValue);

    /// Repair an OpenAPI 3.x document
    fn repair_openapi(&self, spec: &mut JsonValue);
}

/// The repairs applied unless a caller supplies its own
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRepairs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Swagger,
    OpenApi,
}

impl Dialect {
    fn nullable_key(self) -> &'static str {
        match self {
            Dialect::Swagger => "x-nullable",
            Dialect::OpenApi => "nullable",
        }
    }
}

impl SpecRepair for DefaultRepairs {
    fn repair_swagger(&self, spec: &mut JsonValue) {
        fill_info(spec);

        for item in path_items_mut(spec) {
            repair_parameters(item.get_mut("parameters"), Dialect::Swagger);
            for operation in operations_mut(item) {
                repair_parameters(operation.get_mut("parameters"), Dialect::Swagger);
                repair_responses(operation, Dialect::Swagger);
            }
        }

        if let Some(parameters) = spec.get_mut("parameters").and_then(JsonValue::as_object_mut) {
            for parameter in parameters.values_mut() {
                repair_parameter(parameter, Dialect::Swagger);
            }
        }
        if let Some(responses) = spec.get_mut("responses").and_then(JsonValue::as_object_mut) {
            for response in responses.values_mut() {
                repair_response(response, Dialect::Swagger);
            }
        }
        if let Some(definitions) = spec.get_mut("definitions").and_then(JsonValue::as_object_mut)
        {
            for schema in definitions.values_mut() {
                repair_schema(schema, Dialect::Swagger);
            }
        }
    }

    fn repair_openapi(&self, spec: &mut JsonValue) {
        fill_info(spec);

        for item in path_items_mut(spec) {
            repair_parameters(item.get_mut("parameters"), Dialect::OpenApi);
            for operation in operations_mut(item) {
                repair_parameters(operation.get_mut("parameters"), Dialect::OpenApi);
                if let Some(body) = operation.get_mut("requestBody") {
                    repair_content(body, Dialect::OpenApi);
                }
                repair_responses(operation, Dialect::OpenApi);
            }
        }

        let Some(components) = spec.get_mut("components").and_then(JsonValue::as_object_mut)
        else {
            return;
        };
        if let Some(schemas) = components.get_mut("schemas").and_then(JsonValue::as_object_mut) {
            for schema in schemas.values_mut() {
                repair_schema(schema, Dialect::OpenApi);
            }
        }
        if let Some(parameters) = components
            .get_mut("parameters")
            .and_then(JsonValue::as_object_mut)
        {
            for parameter in parameters.values_mut() {
                repair_parameter(parameter, Dialect::OpenApi);
            }
        }
        if let Some(responses) = components
            .get_mut("responses")
            .and_then(JsonValue::as_object_mut)
        {
            for response in responses.values_mut() {
                repair_response(response, Dialect::OpenApi);
            }
        }
        if let Some(bodies) = components
            .get_mut("requestBodies")
            .and_then(JsonValue::as_object_mut)
        {
            for body in bodies.values_mut() {
                repair_content(body, Dialect::OpenApi);
            }
        }
    }
}

/// Mutable path items of a document, skipping anything that is not an object
pub fn path_items_mut(spec: &mut JsonValue) -> impl Iterator<Item = &mut Map<String, JsonValue>> {
    spec.get_mut("paths")
        .and_then(JsonValue::as_object_mut)
        .into_iter()
        .flat_map(|paths| paths.values_mut())
        .filter_map(JsonValue::as_object_mut)
}

/// Mutable operations of a path item
pub fn operations_mut(
    item: &mut Map<String, JsonValue>,
) -> impl Iterator<Item = &mut Map<String, JsonValue>> {
    item.iter_mut()
        .filter(|(key, _)| HTTP_METHODS.contains(&key.as_str()))
        .filter_map(|(_, operation)| operation.as_object_mut())
}

fn fill_info(spec: &mut JsonValue) {
    let Some(info) = spec.get_mut("info").and_then(JsonValue::as_object_mut) else {
        return;
    };
    if !info.get("title").is_some_and(JsonValue::is_string) {
        info.insert("title".to_string(), json!("Untitled API"));
    }
    match info.get("version") {
        Some(JsonValue::String(_)) => {}
        Some(JsonValue::Number(n)) => {
            let version = n.to_string();
            info.insert("version".to_string(), JsonValue::String(version));
        }
        _ => {
            info.insert("version".to_string(), json!("1.0.0"));
        }
    }
}

fn repair_parameters(parameters: Option<&mut JsonValue>, dialect: Dialect) {
    if let Some(JsonValue::Array(parameters)) = parameters {
        for parameter in parameters {
            repair_parameter(parameter, dialect);
        }
    }
}

fn repair_parameter(parameter: &mut JsonValue, dialect: Dialect) {
    let Some(param) = parameter.as_object_mut() else {
        return;
    };
    if param.contains_key("$ref") {
        return;
    }
    let location = param
        .get("in")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();

    if location == "path" {
        param.insert("required".to_string(), JsonValue::Bool(true));
    }

    match dialect {
        Dialect::Swagger if location == "body" => {
            if !param.get("name").is_some_and(JsonValue::is_string) {
                param.insert("name".to_string(), json!("body"));
            }
            if let Some(schema) = param.get_mut("schema") {
                repair_schema(schema, dialect);
            }
        }
        Dialect::Swagger => {
            // Non-body Swagger parameters carry their schema inline.
            coerce_schema_fields(param, dialect);
            if !param.contains_key("type") {
                param.insert("type".to_string(), json!("string"));
            }
            if let Some(items) = param.get_mut("items") {
                repair_schema(items, dialect);
            }
        }
        Dialect::OpenApi => {
            if let Some(schema) = param.get_mut("schema") {
                repair_schema(schema, dialect);
            }
            repair_content(parameter, dialect);
        }
    }
}

fn repair_responses(operation: &mut Map<String, JsonValue>, dialect: Dialect) {
    let has_responses = operation
        .get("responses")
        .and_then(JsonValue::as_object)
        .is_some_and(|responses| !responses.is_empty());
    if !has_responses {
        operation.insert(
            "responses".to_string(),
            json!({ "default": { "description": "successful operation" } }),
        );
    }

    if let Some(responses) = operation
        .get_mut("responses")
        .and_then(JsonValue::as_object_mut)
    {
        for response in responses.values_mut() {
            repair_response(response, dialect);
        }
    }
}

fn repair_response(response: &mut JsonValue, dialect: Dialect) {
    let Some(res) = response.as_object_mut() else {
        return;
    };
    if res.contains_key("$ref") {
        return;
    }
    if !res.get("description").is_some_and(JsonValue::is_string) {
        res.insert("description".to_string(), json!(""));
    }
    match dialect {
        Dialect::Swagger => {
            if let Some(schema) = res.get_mut("schema") {
                repair_schema(schema, dialect);
            }
        }
        Dialect::OpenApi => repair_content(response, dialect),
    }
}

fn repair_content(holder: &mut JsonValue, dialect: Dialect) {
    let Some(content) = holder
        .get_mut("content")
        .and_then(JsonValue::as_object_mut)
    else {
        return;
    };
    for media in content.values_mut() {
        if let Some(schema) = media.get_mut("schema") {
            repair_schema(schema, dialect);
        }
    }
}

fn repair_schema(schema: &mut JsonValue, dialect: Dialect) {
    let Some(map) = schema.as_object_mut() else {
        return;
    };
    if map.contains_key("$ref") {
        return;
    }
    coerce_schema_fields(map, dialect);

    if let Some(properties) = map.get_mut("properties").and_then(JsonValue::as_object_mut) {
        for property in properties.values_mut() {
            repair_schema(property, dialect);
        }
    }
    match map.get_mut("items") {
        Some(JsonValue::Array(items)) => items.iter_mut().for_each(|s| repair_schema(s, dialect)),
        Some(items) => repair_schema(items, dialect),
        None => {}
    }
    if let Some(additional) = map.get_mut("additionalProperties") {
        repair_schema(additional, dialect);
    }
    if let Some(not) = map.get_mut("not") {
        repair_schema(not, dialect);
    }
    for key in ["allOf", "anyOf", "oneOf"] {
        if let Some(JsonValue::Array(members)) = map.get_mut(key) {
            members.iter_mut().for_each(|s| repair_schema(s, dialect));
        }
    }
}

/// Coerce `type` and `required` of one schema-like object
fn coerce_schema_fields(map: &mut Map<String, JsonValue>, dialect: Dialect) {
    match map.get("type").cloned() {
        Some(JsonValue::Array(types)) => {
            let nullable = types.iter().any(|t| t == "null");
            let first = types
                .iter()
                .filter_map(JsonValue::as_str)
                .find(|t| *t != "null")
                .and_then(|t| canonical_type(t, dialect));
            match first {
                Some(ty) => {
                    map.insert("type".to_string(), json!(ty));
                }
                None => {
                    map.remove("type");
                }
            }
            if nullable {
                map.insert(dialect.nullable_key().to_string(), JsonValue::Bool(true));
            }
        }
        Some(JsonValue::String(ty)) => match canonical_type(&ty, dialect) {
            Some(canonical) if canonical == ty => {}
            Some(canonical) => {
                if canonical == "string" && dialect == Dialect::OpenApi && ty == "file" {
                    map.insert("format".to_string(), json!("binary"));
                }
                map.insert("type".to_string(), json!(canonical));
            }
            None => {
                map.remove("type");
            }
        },
        Some(_) => {
            map.remove("type");
        }
        None => {
            if map.contains_key("items") {
                map.insert("type".to_string(), json!("array"));
            } else if map.contains_key("properties") {
                map.insert("type".to_string(), json!("object"));
            }
        }
    }

    if map.get("required").is_some_and(JsonValue::is_boolean) && !map.contains_key("in") {
        map.remove("required");
    }
}

fn canonical_type(ty: &str, dialect: Dialect) -> Option<&'static str> {
    let canonical = match ty.trim().to_ascii_lowercase().as_str() {
        "string" | "str" | "date" | "datetime" | "date-time" | "uuid" | "char" => "string",
        "integer" | "int" | "int32" | "int64" | "long" | "short" => "integer",
        "number" | "float" | "double" | "decimal" => "number",
        "boolean" | "bool" => "boolean",
        "array" | "list" => "array",
        "object" | "map" | "dict" => "object",
        "file" if dialect == Dialect::Swagger => "file",
        "file" => "string",
        _ => return None,
    };
    Some(canonical)
}
