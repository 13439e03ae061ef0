//! Brief intake: parse and validate before anything enters the pipeline

use serde_json::Value;
use thiserror::Error;

use brigade_extraction::SchemaValidator;
use brigade_utils::error::{
    ErrorCategory, FieldViolation, UserFriendlyError, join_violations,
};

use crate::model::Brief;

/// The caller supplied an invalid brief. One entry per invalid field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid brief: {}", join_violations(.violations))]
pub struct BriefValidationError {
    pub violations: Vec<FieldViolation>,
}

impl BriefValidationError {
    fn single(path: &str, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation::new(path, message)],
        }
    }
}

impl UserFriendlyError for BriefValidationError {
    fn user_message(&self) -> String {
        format!(
            "The brief has {} invalid field{}",
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )
    }

    fn context(&self) -> Option<String> {
        Some(
            self.violations
                .iter()
                .map(|v| format!("  {v}"))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        vec![
            "A brief needs a non-empty title (max 200 chars) and a scope of dish, menu or technique"
                .to_string(),
            "Run 'brigade validate-brief --brief <file>' to check a brief without calling the model"
                .to_string(),
        ]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

impl Brief {
    /// Validate against the brief schema.
    ///
    /// # Errors
    ///
    /// Returns every schema violation.
    pub fn validate(&self, schema: &dyn SchemaValidator) -> Result<(), BriefValidationError> {
        let value = serde_json::to_value(self)
            .map_err(|e| BriefValidationError::single("", e.to_string()))?;
        schema
            .validate(&value)
            .map_err(|violations| BriefValidationError { violations })
    }

    /// Parse JSON text into a validated brief.
    ///
    /// The raw document is checked against the schema before it is
    /// deserialized, so unknown or mistyped fields are all reported.
    ///
    /// # Errors
    ///
    /// Returns a violation at the root for malformed JSON, otherwise every
    /// schema violation.
    pub fn from_json(text: &str, schema: &dyn SchemaValidator) -> Result<Self, BriefValidationError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BriefValidationError::single("", format!("not valid JSON: {e}")))?;
        schema
            .validate(&value)
            .map_err(|violations| BriefValidationError { violations })?;
        serde_json::from_value(value).map_err(|e| BriefValidationError::single("", e.to_string()))
    }
}
