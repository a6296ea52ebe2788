//! Engine availability check: runs before anything is spawned.

use consult_core::EngineKind;
use consult_core::error::EngineError;
use consult_core::process::ProcessLauncher;
use tracing::debug;

/// Resolve the engine binary, or explain how to install it.
pub fn check_available(
    launcher: &dyn ProcessLauncher,
    kind: EngineKind,
    binary: &str,
) -> Result<String, EngineError> {
    match launcher.locate(binary) {
        Ok(path) => {
            debug!(engine = %kind, path = %path, "Engine binary located");
            Ok(path)
        }
        Err(reason) => Err(EngineError::Unavailable {
            engine: kind.to_string(),
            reason,
            install_hint: kind.install_hint().to_string(),
        }),
    }
}
