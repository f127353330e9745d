//! String transformation utilities for TypeScript identifiers

/// Converts a string to snake_case.
///
/// Handles camelCase, PascalCase, kebab-case, dotted and space-separated
/// input. Every other non-alphanumeric character acts as a word boundary.
///
/// # Examples
/// ```
/// use oas_sdkgen::core::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
/// assert_eq!(to_snake_case("pet.Store"), "pet_store");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            if prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    result.trim_matches('_').to_string()
}

/// Converts a string to PascalCase, used for interface names.
///
/// # Examples
/// ```
/// use oas_sdkgen::core::utils::to_proper_case;
///
/// assert_eq!(to_proper_case("find_pets_by_status"), "FindPetsByStatus");
/// assert_eq!(to_proper_case("pet-store"), "PetStore");
/// ```
pub fn to_proper_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect()
}

/// Converts a string to camelCase, used for function and file names.
///
/// # Examples
/// ```
/// use oas_sdkgen::core::utils::to_camel_case;
///
/// assert_eq!(to_camel_case("Pet Store"), "petStore");
/// assert_eq!(to_camel_case("get_user_by_id"), "getUserById");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let proper = to_proper_case(s);
    let mut chars = proper.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Makes a name usable as a TypeScript identifier.
///
/// Names starting with a digit get a leading underscore.
pub fn to_identifier(s: &str) -> String {
    let name = to_proper_case(s);
    if name.is_empty() {
        return "_".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
