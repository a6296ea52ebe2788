//! `tokio::process` implementation of the process seam.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use consult_core::process::{EngineCommand, EngineProcess, ProcessExit, ProcessInput, ProcessLauncher};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::debug;

/// Launches real child processes with piped stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn locate(&self, program: &str) -> Result<String, String> {
        which::which(program)
            .map(|path| path.to_string_lossy().into_owned())
            .map_err(|e| e.to_string())
    }

    fn launch(&self, command: &EngineCommand) -> io::Result<Box<dyn EngineProcess>> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        debug!(pid = ?child.id(), program = %command.program, "Engine process spawned");

        let stdin = child.stdin.take().map(|s| Box::new(s) as ProcessInput);
        let stdout = child.stdout.take().map(|out| tokio::spawn(drain(out)));
        let stderr = child.stderr.take().map(|err| tokio::spawn(drain(err)));

        Ok(Box::new(TokioProcess {
            child,
            stdin,
            stdout,
            stderr,
        }))
    }
}

struct TokioProcess {
    child: Child,
    stdin: Option<ProcessInput>,
    stdout: Option<JoinHandle<io::Result<String>>>,
    stderr: Option<JoinHandle<io::Result<String>>>,
}

#[async_trait]
impl EngineProcess for TokioProcess {
    fn take_stdin(&mut self) -> Option<ProcessInput> {
        self.stdin.take()
    }

    async fn wait(&mut self) -> io::Result<ProcessExit> {
        let status = self.child.wait().await?;
        let stdout = collect(self.stdout.take()).await?;
        let stderr = collect(self.stderr.take()).await?;
        Ok(ProcessExit {
            code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }

    fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!(error = %e, "Engine process already gone");
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn collect(handle: Option<JoinHandle<io::Result<String>>>) -> io::Result<String> {
    match handle {
        Some(handle) => handle.await.map_err(io::Error::other)?,
        None => Ok(String::new()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::orchestrator::Orchestrator;
    use consult_core::error::EngineError;
    use std::sync::Arc;
    use std::time::Duration;

    fn sh(script: &str) -> EngineCommand {
        EngineCommand::new("sh", vec!["-c".into(), script.into()])
    }

    #[test]
    fn locate_finds_shell() {
        assert!(TokioLauncher.locate("sh").is_ok());
        assert!(TokioLauncher.locate("consult-definitely-not-installed").is_err());
    }

    #[tokio::test]
    async fn captures_stdout_from_stdin() {
        let orchestrator = Orchestrator::new(Arc::new(TokioLauncher), Duration::from_secs(5));
        let out = orchestrator.invoke(&sh("cat"), "echo me").await;
        assert_eq!(out, Ok("echo me".to_string()));
    }

    #[tokio::test]
    async fn nonzero_exit_reports_stderr() {
        let orchestrator = Orchestrator::new(Arc::new(TokioLauncher), Duration::from_secs(5));
        let out = orchestrator
            .invoke(&sh("cat >/dev/null; echo nope >&2; exit 4"), "")
            .await;
        assert_eq!(
            out,
            Err(EngineError::Exited {
                code: 4,
                stderr: "nope".into()
            })
        );
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_failure() {
        let orchestrator = Orchestrator::new(Arc::new(TokioLauncher), Duration::from_secs(5));
        let command = EngineCommand::new("consult-definitely-not-installed", vec![]);
        let out = orchestrator.invoke(&command, "").await;
        assert!(matches!(out, Err(EngineError::SpawnFailed(_))));
    }
}
