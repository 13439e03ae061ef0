//! Prompt templates for brigade agents
//!
//! A [`PromptSource`] hands out raw template text per [`AgentRole`]; the core
//! does not care where it is stored. [`PromptSet::resolve`] loads and checks
//! the templates for every role once, before a run begins, so a missing or
//! malformed template halts the run before any model call is made.
//!
//! Templates use `{{name}}` placeholders. The names a role may use are fixed:
//!
//! | Role | Placeholders |
//! |------|--------------|
//! | planner | `title`, `scope`, `constraints`, `context`, `brief` |
//! | specialist | planner's + `assignment`, `responsibilities` |
//! | synthesizer | planner's + `task_map`, `contributions` |

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::debug;

use brigade_utils::error::ConfigError;
use brigade_utils::types::AgentRole;

mod builtin;

pub use builtin::BuiltinPrompts;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

const BRIEF_PLACEHOLDERS: &[&str] = &["title", "scope", "constraints", "context", "brief"];

/// Placeholder names available to a role.
#[must_use]
pub fn allowed_placeholders(role: AgentRole) -> Vec<&'static str> {
    let mut names = BRIEF_PLACEHOLDERS.to_vec();
    match role {
        AgentRole::Planner => {}
        AgentRole::Specialist => names.extend(["assignment", "responsibilities"]),
        AgentRole::Synthesizer => names.extend(["task_map", "contributions"]),
    }
    names
}

/// Source of raw template text per agent role.
pub trait PromptSource: Send + Sync {
    /// Return the template text for `role`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingTemplate` if no template exists for the role.
    fn template(&self, role: AgentRole) -> Result<String, ConfigError>;
}

/// Reads `<dir>/<role>.md`.
#[derive(Debug, Clone)]
pub struct DirectoryPromptSource {
    dir: PathBuf,
}

impl DirectoryPromptSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PromptSource for DirectoryPromptSource {
    fn template(&self, role: AgentRole) -> Result<String, ConfigError> {
        let path = self.dir.join(format!("{}.md", role.as_str()));
        debug!(role = %role, path = %path.display(), "Loading prompt template");
        std::fs::read_to_string(&path).map_err(|e| ConfigError::MissingTemplate {
            role,
            reason: format!("{}: {e}", path.display()),
        })
    }
}

/// In-memory templates, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPromptSource {
    templates: HashMap<AgentRole, String>,
}

impl StaticPromptSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, role: AgentRole, template: impl Into<String>) -> Self {
        self.templates.insert(role, template.into());
        self
    }
}

impl PromptSource for StaticPromptSource {
    fn template(&self, role: AgentRole) -> Result<String, ConfigError> {
        self.templates
            .get(&role)
            .cloned()
            .ok_or_else(|| ConfigError::MissingTemplate {
                role,
                reason: "not registered".to_string(),
            })
    }
}

/// A checked template for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    role: AgentRole,
    text: String,
}

impl PromptTemplate {
    /// Check that every placeholder in `text` is available to `role`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingTemplate` for a blank template and
    /// `ConfigError::UnknownPlaceholder` for a placeholder outside the role's set.
    pub fn parse(role: AgentRole, text: impl Into<String>) -> Result<Self, ConfigError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ConfigError::MissingTemplate {
                role,
                reason: "template is empty".to_string(),
            });
        }
        let allowed = allowed_placeholders(role);
        for caps in PLACEHOLDER.captures_iter(&text) {
            let name = &caps[1];
            if !allowed.contains(&name) {
                return Err(ConfigError::UnknownPlaceholder {
                    role,
                    name: name.to_string(),
                });
            }
        }
        Ok(Self { role, text })
    }

    #[must_use]
    pub fn role(&self) -> AgentRole {
        self.role
    }

    /// Substitute placeholders.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownPlaceholder` if a placeholder has no value.
    pub fn render(&self, vars: &BTreeMap<&str, String>) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(self.text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&self.text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let name = &caps[1];
            let value = vars.get(name).ok_or_else(|| ConfigError::UnknownPlaceholder {
                role: self.role,
                name: name.to_string(),
            })?;
            out.push_str(&self.text[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        out.push_str(&self.text[last..]);
        Ok(out)
    }
}

/// Checked templates for every role.
#[derive(Debug, Clone)]
pub struct PromptSet {
    planner: PromptTemplate,
    specialist: PromptTemplate,
    synthesizer: PromptTemplate,
}

impl PromptSet {
    /// Load and check the templates for all roles.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` from the source or from placeholder checks.
    pub fn resolve(source: &dyn PromptSource) -> Result<Self, ConfigError> {
        Ok(Self {
            planner: PromptTemplate::parse(
                AgentRole::Planner,
                source.template(AgentRole::Planner)?,
            )?,
            specialist: PromptTemplate::parse(
                AgentRole::Specialist,
                source.template(AgentRole::Specialist)?,
            )?,
            synthesizer: PromptTemplate::parse(
                AgentRole::Synthesizer,
                source.template(AgentRole::Synthesizer)?,
            )?,
        })
    }

    #[must_use]
    pub fn get(&self, role: AgentRole) -> &PromptTemplate {
        match role {
            AgentRole::Planner => &self.planner,
            AgentRole::Specialist => &self.specialist,
            AgentRole::Synthesizer => &self.synthesizer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect()
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let template =
            PromptTemplate::parse(AgentRole::Planner, "Plan {{ title }} ({{scope}})").unwrap();
        let rendered = template
            .render(&vars(&[("title", "Ramen"), ("scope", "dish")]))
            .unwrap();
        assert_eq!(rendered, "Plan Ramen (dish)");
    }

    #[test]
    fn test_parse_rejects_placeholder_outside_role() {
        let err = PromptTemplate::parse(AgentRole::Planner, "{{contributions}}").unwrap_err();
        match err {
            ConfigError::UnknownPlaceholder { role, name } => {
                assert_eq!(role, AgentRole::Planner);
                assert_eq!(name, "contributions");
            }
            other => panic!("expected UnknownPlaceholder, got {other:?}"),
        }
        assert!(PromptTemplate::parse(AgentRole::Synthesizer, "{{contributions}}").is_ok());
    }

    #[test]
    fn test_parse_rejects_blank_template() {
        assert!(matches!(
            PromptTemplate::parse(AgentRole::Specialist, "  \n"),
            Err(ConfigError::MissingTemplate { .. })
        ));
    }

    #[test]
    fn test_render_missing_value_is_error() {
        let template = PromptTemplate::parse(AgentRole::Planner, "{{title}}").unwrap();
        assert!(template.render(&BTreeMap::new()).is_err());
    }

    #[test]
    fn test_static_source_missing_role_halts_resolution() {
        let source = StaticPromptSource::new()
            .with(AgentRole::Planner, "p {{title}}")
            .with(AgentRole::Specialist, "s {{assignment}}");
        let err = PromptSet::resolve(&source).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingTemplate {
                role: AgentRole::Synthesizer,
                ..
            }
        ));
    }

    #[test]
    fn test_directory_source_reads_role_files() {
        let dir = tempfile::tempdir().unwrap();
        for role in AgentRole::ALL {
            std::fs::write(dir.path().join(format!("{role}.md")), format!("{role}: {{{{title}}}}"))
                .unwrap();
        }
        let set = PromptSet::resolve(&DirectoryPromptSource::new(dir.path())).unwrap();
        let rendered = set
            .get(AgentRole::Synthesizer)
            .render(&vars(&[("title", "Soup")]))
            .unwrap();
        assert_eq!(rendered, "synthesizer: Soup");
    }

    #[test]
    fn test_directory_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectoryPromptSource::new(dir.path())
            .template(AgentRole::Planner)
            .unwrap_err();
        assert!(err.to_string().contains("planner"));
    }

    #[test]
    fn test_builtin_prompts_resolve() {
        assert!(PromptSet::resolve(&BuiltinPrompts).is_ok());
    }
}
