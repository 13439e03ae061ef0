use brigade_utils::error::ConfigError;
use brigade_utils::types::AgentRole;

use crate::PromptSource;

const PLANNER: &str = r#"You are planning the development of a recipe.

Brief:
{{brief}}

Decide which culinary specialists are needed. Reply with a single JSON object:
{"specialists": [{"name": "...", "responsibilities": ["..."], "priority": 1}], "complexity": "low|medium|high"}

Use between 1 and 6 specialists. Priority 1 is the most important.
"#;

const SPECIALIST: &str = r#"You are the {{assignment}} specialist on a kitchen brigade.

Brief:
{{brief}}

Your responsibilities:
{{responsibilities}}

Reply with a single JSON object:
{"contribution": "your detailed recommendations", "highlights": ["short key points"]}
"#;

const SYNTHESIZER: &str = r#"You are the head chef. Combine the work of your brigade into one recipe for "{{title}}".

Brief:
{{brief}}

Plan:
{{task_map}}

Specialist contributions:
{{contributions}}

Reply with a single JSON object:
{"title": "...", "summary": "...", "servings": 4, "prep_minutes": 15, "cook_minutes": 30,
 "ingredients": [{"item": "...", "quantity": "..."}], "steps": ["..."], "notes": ["..."]}
"#;

/// Templates compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPrompts;

impl BuiltinPrompts {
    #[must_use]
    pub const fn text(role: AgentRole) -> &'static str {
        match role {
            AgentRole::Planner => PLANNER,
            AgentRole::Specialist => SPECIALIST,
            AgentRole::Synthesizer => SYNTHESIZER,
        }
    }
}

impl PromptSource for BuiltinPrompts {
    fn template(&self, role: AgentRole) -> Result<String, ConfigError> {
        Ok(Self::text(role).to_string())
    }
}
