//! # Consult Core
//!
//! Domain types, traits, and error definitions for Consult.
//! This crate performs **no I/O**: it defines the domain model
//! that the engine, tools, and CLI crates implement against.
//!
//! ## Design Philosophy
//!
//! The process boundary is a trait here ([`ProcessLauncher`]), so the
//! orchestrator can be driven by real `tokio` processes in production and
//! by scripted processes in tests.

pub mod engine;
pub mod error;
pub mod process;
pub mod role;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use engine::EngineKind;
pub use error::{EngineError, Error, ToolError, ValidationError};
pub use process::{EngineCommand, EngineProcess, ProcessExit, ProcessInput, ProcessLauncher};
pub use role::{AgentRole, validate_model};
pub use tool::{ContentBlock, Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResponse};
