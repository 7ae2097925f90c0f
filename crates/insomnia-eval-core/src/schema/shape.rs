//! JSON Schema check of the top-level document shape.
//!
//! Both documents must be an object keyed by note ID whose values are
//! objects. See `schema/annotations.schema.json`.

use serde_json::Value;
use std::sync::OnceLock;

use crate::annotation::DocumentRole;

use super::SchemaError;

/// Embedded document schema (loaded at compile time).
const DOCUMENT_SCHEMA_JSON: &str = include_str!("../../schema/annotations.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, String> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: Value = match serde_json::from_str(DOCUMENT_SCHEMA_JSON) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    result.as_ref().map_err(|e| e.clone())
}

/// Check that `document` is an object of objects.
///
/// Every violation is reported, each with its JSON pointer.
pub fn check_document_shape(document: &Value, role: DocumentRole) -> Result<(), SchemaError> {
    let validator = get_validator().map_err(|e| SchemaError::InvalidDocument {
        role,
        details: vec![e],
    })?;

    let details: Vec<String> = validator
        .iter_errors(document)
        .map(|e| format!("{} at {}", e, display_pointer(&e.instance_path.to_string())))
        .collect();

    if details.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::InvalidDocument { role, details })
    }
}

fn display_pointer(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}
