use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;

/// Serialize a persisted container as pretty JSON for export.
pub fn export_json<T: Serialize>(value: &T) -> Result<String, CoreError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize export: {e}")))
}

/// Parse an exported blob.
///
/// Only the presence of each top-level key in `required_keys` is checked
/// before typed deserialization; there is no further schema validation.
pub fn import_json<T: DeserializeOwned>(raw: &str, required_keys: &[&str]) -> Result<T, CoreError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| CoreError::InvalidImport(format!("Not valid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| CoreError::InvalidImport("Expected a JSON object at the top level".into()))?;

    let missing: Vec<&str> = required_keys
        .iter()
        .copied()
        .filter(|k| !object.contains_key(*k))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::InvalidImport(format!(
            "Missing required field(s): {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value).map_err(CoreError::from)
}
