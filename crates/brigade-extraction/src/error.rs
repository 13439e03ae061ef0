use thiserror::Error;

use brigade_utils::error::{ErrorCategory, FieldViolation, UserFriendlyError, join_violations};

/// Model output could not be turned into the requested value.
///
/// Every variant carries a bounded excerpt of the raw output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    /// No parse succeeded, directly or on an embedded object
    #[error("Model output is not valid JSON: {reason}")]
    Unparseable { reason: String, excerpt: String },

    /// The output was an array of several values where one object was expected
    #[error("Expected a single object but the model returned an array of {count} elements")]
    MultipleElements { count: usize, excerpt: String },

    /// Parsed, but the value does not satisfy the schema
    #[error("Model output failed schema '{schema}': {}", join_violations(.violations))]
    SchemaViolation {
        schema: String,
        violations: Vec<FieldViolation>,
        excerpt: String,
    },

    /// Parsed and validated, but does not fit the target type
    #[error("Model output does not match the expected shape: {reason}")]
    Shape { reason: String, excerpt: String },
}

impl ExtractionError {
    /// Bounded prefix of the offending output
    #[must_use]
    pub fn excerpt(&self) -> &str {
        match self {
            Self::Unparseable { excerpt, .. }
            | Self::MultipleElements { excerpt, .. }
            | Self::SchemaViolation { excerpt, .. }
            | Self::Shape { excerpt, .. } => excerpt,
        }
    }

    /// Per-field violations, when schema validation was reached
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::SchemaViolation { violations, .. } => violations,
            _ => &[],
        }
    }
}

impl UserFriendlyError for ExtractionError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(format!("Model output began with: {}", self.excerpt()))
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Unparseable { .. } => vec![
                "Enable structured_output for this agent so the service returns JSON".to_string(),
                "Tighten the prompt template to ask for a single JSON object".to_string(),
            ],
            Self::MultipleElements { .. } => vec![
                "Ask for exactly one object in the prompt template".to_string(),
            ],
            Self::SchemaViolation { .. } | Self::Shape { .. } => vec![
                "Describe the required fields explicitly in the prompt template".to_string(),
                "Lower the agent temperature for more consistent output".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Extraction
    }
}
