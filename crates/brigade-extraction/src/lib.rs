//! Tolerant extraction of structured values from model output
//!
//! Model text is noisy: fenced, commented, wrapped in an array or surrounded
//! by prose. [`Extractor::extract`] recovers the intended JSON value in a
//! fixed order of increasingly lenient steps:
//!
//! 1. strip fences, comments and trailing commas
//! 2. parse the cleaned text directly
//! 3. unwrap a single-element array (recorded as a warning)
//! 4. reject a multi-element array with [`ExtractionError::MultipleElements`]
//! 5. validate against the schema, reporting every violation
//! 6. if step 2 failed, retry 2–5 on the first-`{`-to-last-`}` substring
//! 7. otherwise fail with a bounded excerpt of the raw text
//!
//! A returned value always satisfies the supplied schema in full.

mod clean;
mod error;
mod schema;

pub use clean::{clean, embedded_object, strip_comments, strip_fences, strip_trailing_commas};
pub use error::ExtractionError;
pub use schema::{JsonSchemaValidator, SchemaValidator};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Default number of characters kept in error excerpts
pub const DEFAULT_EXCERPT_CHARS: usize = 500;

/// Non-fatal corrections applied during extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionWarning {
    /// `[obj]` was returned instead of `obj`
    UnwrappedSingleElementArray,
    /// The value was cut out of surrounding prose
    RecoveredEmbeddedObject,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnwrappedSingleElementArray => {
                write!(f, "unwrapped a single-element array into its object")
            }
            Self::RecoveredEmbeddedObject => {
                write!(f, "recovered an object embedded in surrounding text")
            }
        }
    }
}

/// A recovered value plus the corrections that were needed
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T = Value> {
    pub value: T,
    pub warnings: Vec<ExtractionWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extractor {
    excerpt_chars: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_CHARS)
    }
}

impl Extractor {
    #[must_use]
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    /// Recover a JSON value from `raw`, validating it against `schema` if given.
    ///
    /// # Errors
    ///
    /// See [`ExtractionError`]; every variant carries a bounded excerpt.
    pub fn extract(
        &self,
        raw: &str,
        schema: Option<&dyn SchemaValidator>,
    ) -> Result<Extracted, ExtractionError> {
        let direct_error = match serde_json::from_str::<Value>(&clean(raw)) {
            Ok(value) => return self.settle(value, Vec::new(), raw, schema),
            Err(e) => e,
        };

        if let Some(candidate) = embedded_object(raw)
            && let Ok(value) = serde_json::from_str::<Value>(&clean(candidate))
        {
            debug!("Recovered JSON object from surrounding text");
            return self.settle(
                value,
                vec![ExtractionWarning::RecoveredEmbeddedObject],
                raw,
                schema,
            );
        }

        Err(ExtractionError::Unparseable {
            reason: direct_error.to_string(),
            excerpt: self.excerpt(raw),
        })
    }

    /// Recover, validate and deserialize into `T`.
    ///
    /// # Errors
    ///
    /// Any [`ExtractionError`] from [`extract`](Self::extract), or
    /// [`ExtractionError::Shape`] if the value does not deserialize into `T`.
    pub fn extract_as<T: DeserializeOwned>(
        &self,
        raw: &str,
        schema: Option<&dyn SchemaValidator>,
    ) -> Result<Extracted<T>, ExtractionError> {
        let Extracted { value, warnings } = self.extract(raw, schema)?;
        let value = serde_json::from_value(value).map_err(|e| ExtractionError::Shape {
            reason: e.to_string(),
            excerpt: self.excerpt(raw),
        })?;
        Ok(Extracted { value, warnings })
    }

    fn settle(
        &self,
        value: Value,
        mut warnings: Vec<ExtractionWarning>,
        raw: &str,
        schema: Option<&dyn SchemaValidator>,
    ) -> Result<Extracted, ExtractionError> {
        let value = match value {
            Value::Array(mut items) if items.len() == 1 => {
                warn!("Model wrapped its object in a single-element array; unwrapping");
                warnings.push(ExtractionWarning::UnwrappedSingleElementArray);
                items.remove(0)
            }
            Value::Array(items) if items.len() > 1 => {
                return Err(ExtractionError::MultipleElements {
                    count: items.len(),
                    excerpt: self.excerpt(raw),
                });
            }
            other => other,
        };

        if let Some(schema) = schema
            && let Err(violations) = schema.validate(&value)
        {
            debug!(
                schema = schema.name(),
                violations = violations.len(),
                "Schema validation failed"
            );
            return Err(ExtractionError::SchemaViolation {
                schema: schema.name().to_string(),
                violations,
                excerpt: self.excerpt(raw),
            });
        }

        Ok(Extracted { value, warnings })
    }

    /// First `excerpt_chars` characters of `raw`, cut on a char boundary.
    #[must_use]
    pub fn excerpt(&self, raw: &str) -> String {
        match raw.char_indices().nth(self.excerpt_chars) {
            Some((cut, _)) => format!("{}…", &raw[..cut]),
            None => raw.to_string(),
        }
    }
}
