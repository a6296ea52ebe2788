pub mod ask;
pub mod doctor;
pub mod roles;
pub mod serve;
pub mod status;

use std::sync::Arc;

use consult_config::ConsultConfig;
use consult_core::tool::ToolRegistry;
use consult_engine::TokioLauncher;

/// Load configuration, reporting failures in a user-facing form.
pub(crate) fn load_config() -> Result<ConsultConfig, Box<dyn std::error::Error>> {
    Ok(ConsultConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The production tool registry, backed by real processes.
pub(crate) fn build_registry(config: &ConsultConfig) -> ToolRegistry {
    consult_tools::default_registry(config, Arc::new(TokioLauncher))
}
