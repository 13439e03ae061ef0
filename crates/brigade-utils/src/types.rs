//! Shared types used across the brigade crates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Closed set of agent roles in the pipeline.
///
/// Each role maps to exactly one agent profile (model, temperature, output
/// budget) and one prompt template. Roles are resolved once when a run starts.
///
/// # Serialization
///
/// `AgentRole` serializes to its lowercase name (e.g., `"planner"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Produces the task map from the brief.
    Planner,
    /// Handles one assignment of the task map; many run concurrently.
    Specialist,
    /// Merges surviving specialist contributions into the final recipe.
    Synthesizer,
}

impl AgentRole {
    /// All roles in pipeline order.
    pub const ALL: [AgentRole; 3] = [Self::Planner, Self::Specialist, Self::Synthesizer];

    /// Canonical lowercase name used in config sections, template file names and logs.
    ///
    /// ```rust
    /// use brigade_utils::types::AgentRole;
    ///
    /// assert_eq!(AgentRole::Planner.as_str(), "planner");
    /// assert_eq!(AgentRole::Synthesizer.as_str(), "synthesizer");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Specialist => "specialist",
            Self::Synthesizer => "synthesizer",
        }
    }

    /// Parse a role name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error message listing the valid roles if the name is unknown.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "planner" => Ok(Self::Planner),
            "specialist" => Ok(Self::Specialist),
            "synthesizer" => Ok(Self::Synthesizer),
            other => Err(format!(
                "Unknown agent role '{other}'. Valid roles: planner, specialist, synthesizer"
            )),
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource-usage counters reported by the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    #[must_use]
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens += rhs.prompt_tokens;
        self.completion_tokens += rhs.completion_tokens;
        self.total_tokens += rhs.total_tokens;
    }
}
