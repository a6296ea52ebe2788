//! Agent roles: the fixed allow-list of personas a request may run as.
//!
//! Every persona is advisory (analysis, planning, review). None of them
//! is an execution persona, and the list is closed at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// An allow-listed operating persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentRole {
    /// System design and trade-off analysis
    Architect,
    /// Breaks work into ordered, verifiable steps
    Planner,
    /// Challenges plans and finds gaps
    Critic,
    /// Requirements and root-cause analysis
    Analyst,
    /// Reviews diffs for correctness and style
    CodeReviewer,
}

impl AgentRole {
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Architect,
        AgentRole::Planner,
        AgentRole::Critic,
        AgentRole::Analyst,
        AgentRole::CodeReviewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Architect => "architect",
            AgentRole::Planner => "planner",
            AgentRole::Critic => "critic",
            AgentRole::Analyst => "analyst",
            AgentRole::CodeReviewer => "code-reviewer",
        }
    }

    /// Comma-separated list of valid role identifiers.
    pub fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validate a raw role identifier against the allow-list.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|r| !value.is_empty() && r.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidRole {
                value: value.to_string(),
                valid: Self::valid_list(),
            })
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

const MAX_MODEL_LEN: usize = 64;

/// Reject model identifiers that could be read as CLI flags or carry
/// shell-hostile characters. Models are passed as a single argv entry.
pub fn validate_model(model: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidModel {
        value: model.to_string(),
        reason,
    };

    if model.is_empty() {
        return Err(invalid("empty"));
    }
    if model.len() > MAX_MODEL_LEN {
        return Err(invalid("longer than 64 characters"));
    }
    if model.starts_with('-') {
        return Err(invalid("must not start with '-'"));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ':' | '/');
    if !model.chars().all(allowed) {
        return Err(invalid("allowed characters are A-Z a-z 0-9 . _ - : /"));
    }
    Ok(())
}
