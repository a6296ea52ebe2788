//! Process orchestrator: runs one engine invocation to completion.
//!
//! Spawns the engine through a [`ProcessLauncher`], streams the prompt to
//! its stdin, and races three sources (close, stdin writer, deadline)
//! into the [`Invocation`] state machine. Exactly one outcome comes back.

use std::sync::Arc;
use std::time::Duration;

use consult_core::error::EngineError;
use consult_core::process::{EngineCommand, ProcessInput, ProcessLauncher};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::invocation::{Invocation, InvocationEvent, Settlement};

pub struct Orchestrator {
    launcher: Arc<dyn ProcessLauncher>,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, timeout: Duration) -> Self {
        Self { launcher, timeout }
    }

    pub fn launcher(&self) -> &Arc<dyn ProcessLauncher> {
        &self.launcher
    }

    /// Run the engine once. Returns the raw captured stdout on success.
    pub async fn invoke(&self, command: &EngineCommand, prompt: &str) -> Result<String, EngineError> {
        let mut invocation = Invocation::new(self.timeout);
        debug!(
            invocation = %invocation.id(),
            program = %command.program,
            args = ?command.args,
            prompt_bytes = prompt.len(),
            "Spawning engine"
        );

        let mut process = match self.launcher.launch(command) {
            Ok(process) => process,
            Err(e) => {
                let settlement = invocation.launch_failed(e.to_string());
                return finish(&invocation, settlement);
            }
        };
        invocation.mark_running();

        let (events_tx, mut events_rx) = mpsc::channel(1);
        match process.take_stdin() {
            Some(stdin) => {
                tokio::spawn(write_prompt(stdin, prompt.to_owned(), events_tx));
            }
            None => drop(events_tx),
        }

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        let settlement = loop {
            let event = tokio::select! {
                exit = process.wait() => match exit {
                    Ok(exit) => InvocationEvent::Closed(exit),
                    Err(e) => InvocationEvent::SpawnFailed(e.to_string()),
                },
                Some(event) = events_rx.recv() => event,
                () = &mut deadline => InvocationEvent::TimedOut,
            };
            if let Some(settlement) = invocation.apply(event) {
                break settlement;
            }
        };

        if settlement.terminate {
            process.terminate();
        }
        finish(&invocation, settlement)
    }
}

fn finish(invocation: &Invocation, settlement: Settlement) -> Result<String, EngineError> {
    let elapsed_ms = invocation.elapsed().as_millis() as u64;

    match &settlement.outcome {
        Ok(stdout) => info!(
            invocation = %invocation.id(),
            elapsed_ms,
            stdout_bytes = stdout.len(),
            "Engine invocation completed"
        ),
        Err(e) => warn!(
            invocation = %invocation.id(),
            elapsed_ms,
            state = ?invocation.state(),
            error = %e,
            "Engine invocation failed"
        ),
    }
    settlement.outcome
}

/// Write the prompt, close stdin, and report a failure if either step breaks.
async fn write_prompt(mut stdin: ProcessInput, prompt: String, events: mpsc::Sender<InvocationEvent>) {
    let result = async {
        stdin.write_all(prompt.as_bytes()).await?;
        stdin.shutdown().await
    }
    .await;
    drop(stdin);

    if let Err(e) = result {
        // The receiver is gone once the invocation has settled.
        let _ = events.send(InvocationEvent::InputWriteFailed(e.to_string())).await;
    }
}
