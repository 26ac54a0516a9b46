//! JSON Schema validation for doctrine documents.
//!
//! Doctrines are validated against schema/doctrine.schema.json before they
//! are deserialized, so structural mistakes are reported all at once.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded doctrine schema (loaded at compile time).
const DOCTRINE_SCHEMA_JSON: &str = include_str!("../../../../schema/doctrine.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(DOCTRINE_SCHEMA_JSON) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(SchemaError::LoadError(e.clone())),
    }
}

/// Validate a doctrine JSON value against the schema.
///
/// Returns every violation as "message at /instance/path".
pub fn validate_doctrine_schema(doctrine_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(doctrine_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> serde_json::Value {
        serde_json::json!({
            "authorityOrder": ["Calamity", "Crystal", "Element"],
            "scaleRules": {},
            "polarity": { "astralThreshold": 2, "umbralThreshold": -2 }
        })
    }

    #[test]
    fn test_minimal_doctrine_passes_schema() {
        assert!(validate_doctrine_schema(&minimal()).is_ok());
    }

    #[test]
    fn test_missing_polarity_fails() {
        let value = serde_json::json!({
            "authorityOrder": ["Crystal"],
            "scaleRules": {}
        });
        let errors = validate_doctrine_schema(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_empty_authority_order_fails() {
        let mut value = minimal();
        value["authorityOrder"] = serde_json::json!([]);
        assert!(validate_doctrine_schema(&value).is_err());
    }

    #[test]
    fn test_unknown_condition_clause_fails() {
        let mut value = minimal();
        value["scaleRules"] = serde_json::json!({
            "era": { "conditionsAny": [ { "axisIsStratum": "Calamity", "axisIsRank": "1" } ] }
        });
        assert!(validate_doctrine_schema(&value).is_err());
    }

    #[test]
    fn test_negative_count_threshold_fails() {
        let mut value = minimal();
        value["scaleRules"] = serde_json::json!({
            "major": { "conditionsAny": [ { "minCountByStratum": { "Primal": -1 } } ] }
        });
        assert!(validate_doctrine_schema(&value).is_err());
    }

    #[test]
    fn test_full_doctrine_passes_schema() {
        let value = serde_json::json!({
            "authorityOrder": ["Calamity", "Crystal", "Divine", "Primal", "Shard", "Persona", "Court", "Element"],
            "scaleRules": {
                "minor": { "conditions": [
                    { "stratumAbsent": "Calamity" },
                    { "axisNotStratum": "Crystal" },
                    { "maxCountByStratum": { "Primal": 1 } }
                ] },
                "major": { "conditionsAny": [
                    { "axisIsStratum": "Crystal" },
                    { "minCountByStratum": { "Primal": 2 } }
                ] },
                "era": { "conditionsAny": [ { "axisIsStratum": "Calamity" } ] }
            },
            "polarity": {
                "astralThreshold": 2,
                "umbralThreshold": -2,
                "divineBalanceCardIds": ["divine-radiant-balance"],
                "stabilizeByOneTierIfBalancePresent": true
            }
        });
        assert!(validate_doctrine_schema(&value).is_ok());
    }
}
