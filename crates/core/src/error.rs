//! Error types for the Consult domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each pipeline stage has its own error enum. Validation and engine
//! failures collapse into [`Error`]; every error ends up as an error
//! [`ToolResponse`](crate::tool::ToolResponse) at dispatch.

use thiserror::Error;

/// The top-level error type for all Consult operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // --- External engine ---
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Rejections raised before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid agent_role: \"{value}\". Valid roles: {valid}")]
    InvalidRole { value: String, valid: String },

    #[error("Invalid model name: \"{value}\" ({reason})")]
    InvalidModel { value: String, reason: &'static str },

    #[error("Too many context files: {count} provided, maximum is {max}")]
    TooManyFiles { count: usize, max: usize },

    #[error("Missing or empty '{0}' argument")]
    MissingArgument(&'static str),
}

/// Failures of an external engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{engine} CLI is not available: {reason}. {install_hint}")]
    Unavailable {
        engine: String,
        reason: String,
        install_hint: String,
    },

    #[error("Failed to spawn engine process: {0}")]
    SpawnFailed(String),

    #[error("Failed to write prompt to engine stdin: {0}")]
    InputWriteFailed(String),

    #[error("Engine timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Engine exited with code {code}: {stderr}")]
    Exited { code: i32, stderr: String },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
