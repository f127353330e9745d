//! JSON schema to TypeScript type mapping

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value as JsonValue;

use crate::core::utils::to_identifier;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern"));

static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("path parameter pattern"));

/// Interface name for a `$ref` such as `#/components/schemas/Pet`
pub fn ref_type_name(reference: &str) -> String {
    let name = reference.rsplit('/').next().unwrap_or(reference);
    to_identifier(name)
}

/// Property key, quoted unless it is a plain identifier
pub fn property_key(name: &str) -> String {
    if IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        JsonValue::String(name.to_string()).to_string()
    }
}

/// Turn `/users/{id}` into the template literal body `/users/${params['id']}`
pub fn path_template(path: &str) -> String {
    PATH_PARAM
        .replace_all(path, |caps: &Captures<'_>| {
            format!("${{params['{}']}}", &caps[1])
        })
        .into_owned()
}

/// TypeScript type for `schema`, with references resolved into `namespace`
pub fn ts_type(schema: &JsonValue, namespace: &str) -> String {
    let Some(map) = schema.as_object() else {
        return "any".to_string();
    };
    if let Some(reference) = map.get("$ref").and_then(JsonValue::as_str) {
        return format!("{namespace}.{}", ref_type_name(reference));
    }

    let base = if let Some(values) = map.get("enum").and_then(JsonValue::as_array) {
        let literals: Vec<String> = values.iter().map(JsonValue::to_string).collect();
        if literals.is_empty() {
            "any".to_string()
        } else {
            literals.join(" | ")
        }
    } else if let Some(members) = composed(map, "oneOf").or_else(|| composed(map, "anyOf")) {
        union(members, " | ", namespace)
    } else if let Some(members) = composed(map, "allOf") {
        union(members, " & ", namespace)
    } else {
        match map.get("type").and_then(JsonValue::as_str) {
            Some("string") if map.get("format").and_then(JsonValue::as_str) == Some("binary") => {
                "Blob".to_string()
            }
            Some("string") => "string".to_string(),
            Some("integer" | "number") => "number".to_string(),
            Some("boolean") => "boolean".to_string(),
            Some("array") => {
                let inner = map
                    .get("items")
                    .map_or_else(|| "any".to_string(), |items| ts_type(items, namespace));
                if inner.contains(' ') {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            Some("object") | None => object_type(map, namespace),
            Some(_) => "any".to_string(),
        }
    };

    if map.get("nullable").and_then(JsonValue::as_bool) == Some(true) {
        format!("{base} | null")
    } else {
        base
    }
}

fn composed<'a>(
    map: &'a serde_json::Map<String, JsonValue>,
    key: &str,
) -> Option<&'a Vec<JsonValue>> {
    map.get(key)
        .and_then(JsonValue::as_array)
        .filter(|members| !members.is_empty())
}

fn union(members: &[JsonValue], separator: &str, namespace: &str) -> String {
    let types: Vec<String> = members.iter().map(|m| ts_type(m, namespace)).collect();
    if types.len() == 1 {
        return types.into_iter().next().unwrap_or_default();
    }
    types
        .iter()
        .map(|t| if t.contains(' ') { format!("({t})") } else { t.clone() })
        .collect::<Vec<_>>()
        .join(separator)
}

fn object_type(map: &serde_json::Map<String, JsonValue>, namespace: &str) -> String {
    let properties = map.get("properties").and_then(JsonValue::as_object);
    match (properties, map.get("additionalProperties")) {
        (Some(properties), _) if !properties.is_empty() => {
            let required = required_names(map);
            let fields: Vec<String> = properties
                .iter()
                .map(|(name, schema)| {
                    let optional = if required.contains(&name.as_str()) { "" } else { "?" };
                    format!(
                        "{}{optional}: {}",
                        property_key(name),
                        ts_type(schema, namespace)
                    )
                })
                .collect();
            format!("{{ {}; }}", fields.join("; "))
        }
        (_, Some(additional)) if additional.is_object() => {
            format!("Record<string, {}>", ts_type(additional, namespace))
        }
        _ => "Record<string, any>".to_string(),
    }
}

/// Names listed in a schema's `required` array
pub fn required_names(map: &serde_json::Map<String, JsonValue>) -> Vec<&str> {
    map.get("required")
        .and_then(JsonValue::as_array)
        .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
        .unwrap_or_default()
}
