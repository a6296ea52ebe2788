//! External reasoning engines Consult knows how to drive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CLI-based reasoning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Codex,
    Gemini,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Codex, EngineKind::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Codex => "codex",
            EngineKind::Gemini => "gemini",
        }
    }

    /// Binary name looked up on `PATH` when no explicit binary is configured.
    pub fn default_binary(&self) -> &'static str {
        self.as_str()
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            EngineKind::Codex => "gpt-5-codex",
            EngineKind::Gemini => "gemini-2.5-pro",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            EngineKind::Codex => "Install with: npm install -g @openai/codex",
            EngineKind::Gemini => "Install with: npm install -g @google/gemini-cli",
        }
    }

    /// Name of the tool that fronts this engine.
    pub fn tool_name(&self) -> &'static str {
        match self {
            EngineKind::Codex => "ask_codex",
            EngineKind::Gemini => "ask_gemini",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "codex" => Ok(EngineKind::Codex),
            "gemini" => Ok(EngineKind::Gemini),
            other => Err(format!("unknown engine '{other}' (expected codex or gemini)")),
        }
    }
}
