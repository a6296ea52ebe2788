//! Prompt composition and persona instructions.

use std::fmt;
use std::path::Path;

use consult_core::AgentRole;
use tracing::{debug, warn};

const SECTION_SEPARATOR: &str = "\n\n";

/// The final prompt streamed to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// System instructions, then file context (if any), then the user prompt.
pub fn compose(user_prompt: &str, file_context: Option<&str>, system: &str) -> ComposedPrompt {
    let mut sections = vec![system];
    if let Some(context) = file_context {
        sections.push(context);
    }
    sections.push(user_prompt);
    ComposedPrompt(sections.join(SECTION_SEPARATOR))
}

/// Resolve the persona instructions for a role.
///
/// `<prompts_dir>/<role>.md` wins when present and non-empty; otherwise the
/// built-in persona is used.
pub fn system_instructions(role: AgentRole, prompts_dir: Option<&Path>) -> String {
    if let Some(dir) = prompts_dir {
        let path = dir.join(format!("{}.md", role.as_str()));
        match std::fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => {
                debug!(role = %role, path = %path.display(), "Using persona override");
                return content.trim().to_string();
            }
            Ok(_) => warn!(path = %path.display(), "Persona override is empty, using built-in"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to read persona override"),
        }
    }
    builtin_instructions(role).to_string()
}

fn builtin_instructions(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Architect => {
            "You are a software architect. Analyse the system described below, \
             identify structural risks and trade-offs, and recommend a design. \
             Do not modify files; respond with analysis only."
        }
        AgentRole::Planner => {
            "You are a planning specialist. Break the request below into small, \
             ordered, verifiable steps with clear acceptance criteria. \
             Do not modify files; respond with the plan only."
        }
        AgentRole::Critic => {
            "You are a critical reviewer of plans and designs. Find gaps, hidden \
             assumptions, and failure modes in the material below, ranked by impact. \
             Do not modify files; respond with your critique only."
        }
        AgentRole::Analyst => {
            "You are a requirements and root-cause analyst. Clarify what is being \
             asked, list unknowns, and trace problems to their causes. \
             Do not modify files; respond with analysis only."
        }
        AgentRole::CodeReviewer => {
            "You are a meticulous code reviewer. Review the code below for \
             correctness, security, and maintainability, citing file and line. \
             Do not modify files; respond with review comments only."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_orders_sections() {
        let prompt = compose("What now?", Some("--- File: a ---\nA"), "SYSTEM");
        assert_eq!(prompt.as_str(), "SYSTEM\n\n--- File: a ---\nA\n\nWhat now?");
    }

    #[test]
    fn compose_omits_missing_context() {
        let prompt = compose("What now?", None, "SYSTEM");
        assert_eq!(prompt.to_string(), "SYSTEM\n\nWhat now?");
    }

    #[test]
    fn every_role_has_builtin_instructions() {
        for role in AgentRole::ALL {
            assert!(!system_instructions(role, None).is_empty());
        }
    }

    #[test]
    fn prompts_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("critic.md"), "  Be harsh.\n").unwrap();

        assert_eq!(
            system_instructions(AgentRole::Critic, Some(dir.path())),
            "Be harsh."
        );
        assert_eq!(
            system_instructions(AgentRole::Planner, Some(dir.path())),
            builtin_instructions(AgentRole::Planner)
        );
    }

    #[test]
    fn empty_override_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("analyst.md"), "\n\n").unwrap();
        assert_eq!(
            system_instructions(AgentRole::Analyst, Some(dir.path())),
            builtin_instructions(AgentRole::Analyst)
        );
    }
}
