//! Fixed command-line shapes for each engine.
//!
//! Only the program path and the model vary; every other flag is fixed.

use consult_core::EngineKind;
use consult_core::process::EngineCommand;

/// Build the argument list for one non-interactive engine run.
///
/// The prompt is never part of argv; it is streamed over stdin.
pub fn engine_command(kind: EngineKind, program: impl Into<String>, model: &str) -> EngineCommand {
    let args = match kind {
        // exec mode, model, JSONL event output, unattended
        EngineKind::Codex => vec![
            "exec".to_string(),
            "-m".to_string(),
            model.to_string(),
            "--json".to_string(),
            "--full-auto".to_string(),
        ],
        EngineKind::Gemini => vec![
            "--model".to_string(),
            model.to_string(),
            "--yolo".to_string(),
        ],
    };
    EngineCommand::new(program, args)
}
