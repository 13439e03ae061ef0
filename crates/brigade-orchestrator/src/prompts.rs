//! Template variables for each phase

use std::collections::BTreeMap;

use brigade_prompt_template::PromptTemplate;
use brigade_utils::error::ConfigError;

use crate::model::{Assignment, Brief, SpecialistResult, TaskMap};

type Vars = BTreeMap<&'static str, String>;

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn brief_vars(brief: &Brief) -> Vars {
    let mut vars = Vars::new();
    vars.insert("title", brief.title.clone());
    vars.insert("scope", brief.scope.to_string());
    vars.insert("constraints", bullet_list(&brief.constraints));
    vars.insert(
        "context",
        brief.context.clone().unwrap_or_else(|| "(none)".to_string()),
    );

    let mut block = format!("Title: {}\nScope: {}", brief.title, brief.scope);
    if !brief.constraints.is_empty() {
        block.push_str("\nConstraints:\n");
        block.push_str(&bullet_list(&brief.constraints));
    }
    if let Some(context) = &brief.context {
        block.push_str("\nContext: ");
        block.push_str(context);
    }
    vars.insert("brief", block);
    vars
}

pub(crate) fn planner_prompt(
    template: &PromptTemplate,
    brief: &Brief,
) -> Result<String, ConfigError> {
    template.render(&brief_vars(brief))
}

pub(crate) fn specialist_prompt(
    template: &PromptTemplate,
    brief: &Brief,
    assignment: &Assignment,
) -> Result<String, ConfigError> {
    let mut vars = brief_vars(brief);
    vars.insert("assignment", assignment.name.clone());
    vars.insert("responsibilities", bullet_list(&assignment.responsibilities));
    template.render(&vars)
}

/// Only the surviving contributions are rendered.
pub(crate) fn synthesizer_prompt(
    template: &PromptTemplate,
    brief: &Brief,
    task_map: &TaskMap,
    results: &[SpecialistResult],
) -> Result<String, ConfigError> {
    let mut vars = brief_vars(brief);

    let plan = task_map
        .specialists
        .iter()
        .map(|a| {
            format!(
                "- {} (priority {}): {}",
                a.name,
                a.priority,
                a.responsibilities.join("; ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    vars.insert("task_map", plan);

    let contributions = results
        .iter()
        .map(|r| {
            let mut section = format!("### {}\n{}", r.specialist, r.contribution);
            if !r.highlights.is_empty() {
                section.push_str("\nKey points:\n");
                section.push_str(&bullet_list(&r.highlights));
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    vars.insert("contributions", contributions);

    template.render(&vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BriefScope, Complexity};
    use brigade_prompt_template::{BuiltinPrompts, PromptSet};
    use brigade_utils::types::AgentRole;

    fn brief() -> Brief {
        Brief::new("Miso soup", BriefScope::Dish).with_constraint("vegan")
    }

    #[test]
    fn test_builtin_templates_render_for_every_phase() {
        let prompts = PromptSet::resolve(&BuiltinPrompts).unwrap();
        let assignment = Assignment {
            name: "broth".to_string(),
            responsibilities: vec!["dashi".to_string()],
            priority: 1,
        };
        let map = TaskMap {
            specialists: vec![assignment.clone()],
            complexity: Complexity::Low,
        };
        let result = SpecialistResult {
            specialist: "specialist:broth".to_string(),
            contribution: "Use kombu and shiitake.".to_string(),
            highlights: vec!["no bonito".to_string()],
        };

        let planner = planner_prompt(prompts.get(AgentRole::Planner), &brief()).unwrap();
        assert!(planner.contains("Title: Miso soup"));
        assert!(planner.contains("- vegan"));

        let specialist = specialist_prompt(
            prompts.get(AgentRole::Specialist),
            &brief(),
            &assignment,
        )
        .unwrap();
        assert!(specialist.contains("broth specialist"));
        assert!(specialist.contains("- dashi"));

        let synth = synthesizer_prompt(
            prompts.get(AgentRole::Synthesizer),
            &brief(),
            &map,
            &[result],
        )
        .unwrap();
        assert!(synth.contains("### specialist:broth"));
        assert!(synth.contains("- broth (priority 1): dashi"));
        assert!(!synth.contains("{{"));
    }
}
