//! Engine-backed advisory tools for Consult.
//!
//! Each tool sends one prompt to an external reasoning engine under an
//! allow-listed advisory role, with optional file context inlined:
//!
//! - `ask_codex`: Codex CLI (`codex exec --json`)
//! - `ask_gemini`: Gemini CLI

pub mod ask;
pub mod context;
pub mod prompt;

use std::sync::Arc;

use consult_config::ConsultConfig;
use consult_core::EngineKind;
use consult_core::process::ProcessLauncher;
use consult_core::tool::ToolRegistry;
use consult_engine::Orchestrator;

pub use ask::{AskEngineTool, AskRequest};
pub use context::{ContextAssembler, ContextFile, MAX_CONTEXT_FILE_BYTES};
pub use prompt::{ComposedPrompt, compose, system_instructions};

/// Create a registry with one ask tool per engine, sharing one orchestrator.
pub fn default_registry(config: &ConsultConfig, launcher: Arc<dyn ProcessLauncher>) -> ToolRegistry {
    let orchestrator = Arc::new(Orchestrator::new(launcher, config.timeout()));
    let mut registry = ToolRegistry::new();
    for kind in EngineKind::ALL {
        registry.register(Box::new(AskEngineTool::new(kind, config, orchestrator.clone())));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_engine::scripted::{Script, ScriptedLauncher};

    #[test]
    fn registry_exposes_both_engines() {
        let registry = default_registry(
            &ConsultConfig::default(),
            Arc::new(ScriptedLauncher::new(Script::Hang)),
        );
        assert_eq!(registry.names(), ["ask_codex", "ask_gemini"]);
    }
}
