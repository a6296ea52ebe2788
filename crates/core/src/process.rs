//! Process seam: the abstraction over spawning an external engine.
//!
//! The orchestrator only ever talks to these traits. The real
//! implementation wraps `tokio::process`; tests plug in scripted
//! processes so that spawn counts and kill counts can be asserted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWrite;

/// A fully resolved command line for one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCommand {
    /// Program to execute (name on `PATH` or absolute path)
    pub program: String,

    /// Fixed argument list
    pub args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// What a process reported when it closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `-1` when the process was ended by a signal
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Writable end of a child's stdin.
pub type ProcessInput = Box<dyn AsyncWrite + Send + Unpin>;

/// A running engine process.
#[async_trait]
pub trait EngineProcess: Send {
    /// Hand out the stdin pipe. Returns `None` after the first call.
    fn take_stdin(&mut self) -> Option<ProcessInput>;

    /// Resolve once the process has closed and its output is drained.
    ///
    /// An `Err` is a process-level failure, not a non-zero exit.
    async fn wait(&mut self) -> std::io::Result<ProcessExit>;

    /// Request termination. Best-effort; must not block on the exit.
    fn terminate(&mut self);
}

/// Creates engine processes.
pub trait ProcessLauncher: Send + Sync {
    /// Resolve a program name to something launchable, without running it.
    fn locate(&self, program: &str) -> Result<String, String>;

    fn launch(&self, command: &EngineCommand) -> std::io::Result<Box<dyn EngineProcess>>;
}
