//! External engine execution for Consult.
//!
//! - [`orchestrator`] runs one bounded-time invocation over the process seam
//! - [`invocation`] is the exactly-once settlement state machine
//! - [`launcher`] is the real `tokio::process` launcher
//! - [`output`] turns the engine's JSONL event stream into plain text
//! - `scripted` (feature `test-util`) is a deterministic launcher for tests

pub mod availability;
pub mod command;
pub mod invocation;
pub mod launcher;
pub mod orchestrator;
pub mod output;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use availability::check_available;
pub use command::engine_command;
pub use invocation::{Invocation, InvocationEvent, InvocationState, SettleReason, Settlement};
pub use launcher::TokioLauncher;
pub use orchestrator::Orchestrator;
pub use output::extract_text;
