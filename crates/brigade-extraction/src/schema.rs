use serde_json::Value;

use brigade_utils::error::{ConfigError, FieldViolation};

/// Checks a JSON value against a schema, reporting every violation.
pub trait SchemaValidator: Send + Sync {
    /// Schema name used in logs and errors
    fn name(&self) -> &str;

    /// Validate `value`.
    ///
    /// # Errors
    ///
    /// Returns every violated field path with its reason, in document order.
    fn validate(&self, value: &Value) -> Result<(), Vec<FieldViolation>>;
}

/// JSON Schema validator backed by the `jsonschema` crate
pub struct JsonSchemaValidator {
    name: String,
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSchema` if the schema does not compile.
    pub fn new(name: impl Into<String>, schema: &Value) -> Result<Self, ConfigError> {
        let name = name.into();
        let validator =
            jsonschema::validator_for(schema).map_err(|e| ConfigError::InvalidSchema {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { name, validator })
    }
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, value: &Value) -> Result<(), Vec<FieldViolation>> {
        let violations: Vec<FieldViolation> = self
            .validator
            .iter_errors(value)
            .map(|e| FieldViolation::new(e.instance_path.to_string(), e.to_string()))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> JsonSchemaValidator {
        JsonSchemaValidator::new(
            "person",
            &json!({
                "type": "object",
                "required": ["name", "age"],
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "age": {"type": "integer", "minimum": 0}
                }
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_value_passes() {
        assert!(
            person_schema()
                .validate(&json!({"name": "Ada", "age": 36}))
                .is_ok()
        );
    }

    #[test]
    fn test_reports_every_violation() {
        let violations = person_schema()
            .validate(&json!({"name": "", "age": -1}))
            .unwrap_err();
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(violations.len(), 2);
        assert!(paths.contains(&"/name"));
        assert!(paths.contains(&"/age"));
    }

    #[test]
    fn test_invalid_schema_is_config_error() {
        let err = JsonSchemaValidator::new("broken", &json!({"type": 12})).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchema { .. }));
    }
}
