//! Built-in JSON schemas for the brief and every agent's output

use serde_json::{Value, json};

use brigade_extraction::JsonSchemaValidator;
use brigade_utils::error::ConfigError;

/// Longest accepted brief title, in characters
pub const MAX_TITLE_CHARS: u64 = 200;
/// Most constraints a brief may carry
pub const MAX_CONSTRAINTS: u64 = 32;
/// Longest accepted brief context, in characters
pub const MAX_CONTEXT_CHARS: u64 = 4000;

#[must_use]
pub fn brief_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Brief",
        "type": "object",
        "additionalProperties": false,
        "required": ["title", "scope"],
        "properties": {
            "title": {
                "type": "string",
                "minLength": 1,
                "maxLength": MAX_TITLE_CHARS,
                "pattern": "\\S"
            },
            "scope": {"enum": ["dish", "menu", "technique"]},
            "constraints": {
                "type": "array",
                "maxItems": MAX_CONSTRAINTS,
                "items": {"type": "string", "minLength": 1, "pattern": "\\S"}
            },
            "context": {"type": "string", "maxLength": MAX_CONTEXT_CHARS}
        }
    })
}

#[must_use]
pub fn task_map_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "TaskMap",
        "type": "object",
        "required": ["specialists", "complexity"],
        "properties": {
            "specialists": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["name", "responsibilities"],
                    "properties": {
                        "name": {"type": "string", "minLength": 1, "pattern": "\\S"},
                        "responsibilities": {
                            "type": "array",
                            "minItems": 1,
                            "items": {"type": "string", "minLength": 1}
                        },
                        "priority": {"type": "integer", "minimum": 1, "maximum": 10}
                    }
                }
            },
            "complexity": {"enum": ["low", "medium", "high"]}
        }
    })
}

#[must_use]
pub fn specialist_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "SpecialistResult",
        "type": "object",
        "required": ["contribution"],
        "properties": {
            "contribution": {"type": "string", "minLength": 1, "pattern": "\\S"},
            "highlights": {"type": "array", "items": {"type": "string"}}
        }
    })
}

#[must_use]
pub fn recipe_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Recipe",
        "type": "object",
        "required": ["title", "summary", "servings", "ingredients", "steps"],
        "properties": {
            "title": {"type": "string", "minLength": 1},
            "summary": {"type": "string"},
            "servings": {"type": "integer", "minimum": 1},
            "prep_minutes": {"type": "integer", "minimum": 0},
            "cook_minutes": {"type": "integer", "minimum": 0},
            "ingredients": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["item", "quantity"],
                    "properties": {
                        "item": {"type": "string", "minLength": 1},
                        "quantity": {"type": "string"},
                        "notes": {"type": "string"}
                    }
                }
            },
            "steps": {
                "type": "array",
                "minItems": 1,
                "items": {"type": "string", "minLength": 1}
            },
            "notes": {"type": "array", "items": {"type": "string"}}
        }
    })
}

/// Compiled validators for every pipeline value
#[derive(Debug)]
pub struct Schemas {
    pub brief: JsonSchemaValidator,
    pub task_map: JsonSchemaValidator,
    pub specialist: JsonSchemaValidator,
    pub recipe: JsonSchemaValidator,
}

impl Schemas {
    /// Compile the built-in schemas.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSchema` if a schema fails to compile.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self {
            brief: JsonSchemaValidator::new("brief", &brief_schema())?,
            task_map: JsonSchemaValidator::new("task_map", &task_map_schema())?,
            specialist: JsonSchemaValidator::new("specialist", &specialist_schema())?,
            recipe: JsonSchemaValidator::new("recipe", &recipe_schema())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_extraction::SchemaValidator;

    #[test]
    fn test_builtin_schemas_compile() {
        assert!(Schemas::builtin().is_ok());
    }

    #[test]
    fn test_task_map_requires_a_specialist() {
        let schemas = Schemas::builtin().unwrap();
        let violations = schemas
            .task_map
            .validate(&json!({"specialists": [], "complexity": "low"}))
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/specialists");
    }

    #[test]
    fn test_recipe_schema_accepts_minimal_recipe() {
        let schemas = Schemas::builtin().unwrap();
        let recipe = json!({
            "title": "Toast",
            "summary": "Bread, heated.",
            "servings": 1,
            "ingredients": [{"item": "bread", "quantity": "1 slice"}],
            "steps": ["Toast the bread."]
        });
        assert!(schemas.recipe.validate(&recipe).is_ok());
    }
}
