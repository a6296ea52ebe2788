//! Scripted process launcher for tests.
//!
//! Each launch produces a process that follows a fixed [`Script`]. The
//! launcher records how often it launched and how often a process was
//! asked to terminate, plus everything written to stdin.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use consult_core::process::{EngineCommand, EngineProcess, ProcessExit, ProcessInput, ProcessLauncher};
use tokio::io::AsyncWrite;
use tokio::sync::Notify;

/// How a scripted process behaves.
#[derive(Debug, Clone)]
pub enum Script {
    /// Read all of stdin, then close with this exit.
    Exit(ProcessExit),
    /// Read all of stdin, wait, then close with this exit.
    ExitAfter(Duration, ProcessExit),
    /// Never close.
    Hang,
    /// `launch` itself fails with this message.
    LaunchError(String),
    /// Closing fails at the process level.
    WaitError(String),
    /// stdin rejects every write; the process never closes.
    BrokenStdin,
    /// The binary cannot be located.
    Missing,
}

#[derive(Default)]
struct Recorder {
    launches: AtomicUsize,
    kills: AtomicUsize,
    stdin_closed: AtomicBool,
    input: Mutex<Vec<u8>>,
    last_command: Mutex<Option<EngineCommand>>,
    input_done: Notify,
}

pub struct ScriptedLauncher {
    script: Script,
    recorder: Arc<Recorder>,
}

impl ScriptedLauncher {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            recorder: Arc::new(Recorder::default()),
        }
    }

    pub fn launches(&self) -> usize {
        self.recorder.launches.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.recorder.kills.load(Ordering::SeqCst)
    }

    pub fn stdin_closed(&self) -> bool {
        self.recorder.stdin_closed.load(Ordering::SeqCst)
    }

    /// Everything written to stdin so far, lossily decoded.
    pub fn received_input(&self) -> String {
        let input = self.recorder.input.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&input).into_owned()
    }

    pub fn last_command(&self) -> Option<EngineCommand> {
        self.recorder
            .last_command
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    fn locate(&self, program: &str) -> Result<String, String> {
        match self.script {
            Script::Missing => Err(format!("cannot find binary path for '{program}'")),
            _ => Ok(program.to_string()),
        }
    }

    fn launch(&self, command: &EngineCommand) -> io::Result<Box<dyn EngineProcess>> {
        self.recorder.launches.fetch_add(1, Ordering::SeqCst);
        *self
            .recorder
            .last_command
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(command.clone());

        match &self.script {
            Script::LaunchError(reason) => Err(io::Error::new(io::ErrorKind::NotFound, reason.clone())),
            Script::Missing => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", command.program),
            )),
            script => Ok(Box::new(ScriptedProcess {
                script: script.clone(),
                recorder: self.recorder.clone(),
                stdin_taken: false,
            })),
        }
    }
}

struct ScriptedProcess {
    script: Script,
    recorder: Arc<Recorder>,
    stdin_taken: bool,
}

impl ScriptedProcess {
    async fn input_consumed(&self) {
        if self.stdin_taken {
            self.recorder.input_done.notified().await;
        }
    }
}

#[async_trait]
impl EngineProcess for ScriptedProcess {
    fn take_stdin(&mut self) -> Option<ProcessInput> {
        if self.stdin_taken {
            return None;
        }
        self.stdin_taken = true;
        Some(Box::new(ScriptedStdin {
            recorder: self.recorder.clone(),
            broken: matches!(self.script, Script::BrokenStdin),
        }))
    }

    async fn wait(&mut self) -> io::Result<ProcessExit> {
        match &self.script {
            Script::Exit(exit) => {
                self.input_consumed().await;
                Ok(exit.clone())
            }
            Script::ExitAfter(delay, exit) => {
                self.input_consumed().await;
                tokio::time::sleep(*delay).await;
                Ok(exit.clone())
            }
            Script::WaitError(reason) => Err(io::Error::other(reason.clone())),
            Script::Hang | Script::BrokenStdin | Script::LaunchError(_) | Script::Missing => {
                std::future::pending().await
            }
        }
    }

    fn terminate(&mut self) {
        self.recorder.kills.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedStdin {
    recorder: Arc<Recorder>,
    broken: bool,
}

impl AsyncWrite for ScriptedStdin {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        if self.broken {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")));
        }
        self.recorder
            .input
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.recorder.stdin_closed.store(true, Ordering::SeqCst);
        self.recorder.input_done.notify_one();
        Poll::Ready(Ok(()))
    }
}
