//! Values flowing through the pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// What kind of artifact the brief asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefScope {
    Dish,
    Menu,
    Technique,
}

impl fmt::Display for BriefScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dish => write!(f, "dish"),
            Self::Menu => write!(f, "menu"),
            Self::Technique => write!(f, "technique"),
        }
    }
}

/// The caller's request. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    pub title: String,
    pub scope: BriefScope,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Brief {
    #[must_use]
    pub fn new(title: impl Into<String>, scope: BriefScope) -> Self {
        Self {
            title: title.into(),
            scope,
            constraints: Vec::new(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Coarse estimate of how hard the brief is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// One specialist the planner wants consulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub responsibilities: Vec<String>,
    /// 1 is the most important
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    3
}

/// Planning output. Exactly one specialist invocation per assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMap {
    pub specialists: Vec<Assignment>,
    pub complexity: Complexity,
}

impl TaskMap {
    /// Agent identifiers for the assignments, in order.
    ///
    /// Duplicate names get a `#n` suffix so every invocation stays distinct.
    #[must_use]
    pub fn agent_ids(&self) -> Vec<String> {
        let mut used = HashSet::with_capacity(self.specialists.len());
        let mut ids = Vec::with_capacity(self.specialists.len());
        for assignment in &self.specialists {
            let base = format!("specialist:{}", assignment.name);
            let mut candidate = base.clone();
            let mut n = 1;
            while used.contains(&candidate) {
                n += 1;
                candidate = format!("{base}#{n}");
            }
            used.insert(candidate.clone());
            ids.push(candidate);
        }
        ids
    }
}

/// Raw specialist output as the model returns it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct SpecialistOutput {
    pub contribution: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// One surviving specialist contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistResult {
    /// Agent identifier of the specialist
    pub specialist: String,
    pub contribution: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The synthesized artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub summary: String,
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_minutes: Option<u32>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(name: &str) -> Assignment {
        Assignment {
            name: name.to_string(),
            responsibilities: vec!["cook".to_string()],
            priority: 1,
        }
    }

    #[test]
    fn test_agent_ids_disambiguate_duplicates() {
        let map = TaskMap {
            specialists: vec![assignment("sauce"), assignment("pastry"), assignment("sauce")],
            complexity: Complexity::Low,
        };
        assert_eq!(
            map.agent_ids(),
            vec![
                "specialist:sauce",
                "specialist:pastry",
                "specialist:sauce#2"
            ]
        );
    }

    #[test]
    fn test_agent_ids_stay_unique_when_names_carry_suffixes() {
        let map = TaskMap {
            specialists: vec![assignment("sauce#2"), assignment("sauce"), assignment("sauce")],
            complexity: Complexity::Medium,
        };
        let ids = map.agent_ids();
        assert_eq!(
            ids,
            vec![
                "specialist:sauce#2",
                "specialist:sauce",
                "specialist:sauce#3"
            ]
        );
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_brief_serializes_without_empty_context() {
        let brief = Brief::new("Ramen", BriefScope::Dish).with_constraint("vegetarian");
        let value = serde_json::to_value(&brief).unwrap();
        assert_eq!(value["scope"], "dish");
        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_assignment_priority_defaults() {
        let a: Assignment =
            serde_json::from_str(r#"{"name": "sauce", "responsibilities": ["mother sauces"]}"#)
                .unwrap();
        assert_eq!(a.priority, 3);
    }
}
