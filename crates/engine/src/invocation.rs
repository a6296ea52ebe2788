//! Invocation state machine.
//!
//! ```text
//! Spawned → Running → { TimedOut | Closed | SpawnFailed | InputWriteFailed } → Settled
//! ```
//!
//! Every event source (timer, close notification, process error, stdin
//! writer) reports through [`Invocation::apply`]. The first event settles
//! the invocation; everything after that is ignored.

use std::time::{Duration, Instant};

use consult_core::error::EngineError;
use consult_core::process::ProcessExit;
use tracing::debug;
use uuid::Uuid;

const NO_STDERR: &str = "(no stderr output)";

/// Why an invocation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleReason {
    TimedOut,
    Closed,
    SpawnFailed,
    InputWriteFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Spawned,
    Running,
    Settled(SettleReason),
}

/// A terminal event reported by one of the racing sources.
#[derive(Debug, Clone)]
pub enum InvocationEvent {
    TimedOut,
    Closed(ProcessExit),
    SpawnFailed(String),
    InputWriteFailed(String),
}

/// The single outcome of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Raw captured stdout on success
    pub outcome: Result<String, EngineError>,

    /// Whether the child must be terminated
    pub terminate: bool,
}

/// One bounded-time run of an external engine.
#[derive(Debug)]
pub struct Invocation {
    id: Uuid,
    timeout: Duration,
    started: Instant,
    state: InvocationState,
}

impl Invocation {
    pub fn new(timeout: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            timeout,
            started: Instant::now(),
            state: InvocationState::Spawned,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, InvocationState::Settled(_))
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The child process exists and its events may now fire.
    pub fn mark_running(&mut self) {
        if self.state == InvocationState::Spawned {
            self.state = InvocationState::Running;
        }
    }

    /// Settle a launch that never produced a child.
    ///
    /// Launching is the only step before `Running`, so no other event can
    /// have settled the invocation yet. There is no handle to terminate.
    pub fn launch_failed(&mut self, reason: String) -> Settlement {
        debug_assert_eq!(self.state, InvocationState::Spawned);
        self.state = InvocationState::Settled(SettleReason::SpawnFailed);
        Settlement {
            outcome: Err(EngineError::SpawnFailed(reason)),
            terminate: false,
        }
    }

    /// Feed an event. Returns the settlement for the first event only.
    pub fn apply(&mut self, event: InvocationEvent) -> Option<Settlement> {
        if let InvocationState::Settled(reason) = self.state {
            debug!(invocation = %self.id, ?reason, ?event, "Ignoring event after settlement");
            return None;
        }

        let (reason, settlement) = match event {
            InvocationEvent::TimedOut => (
                SettleReason::TimedOut,
                Settlement {
                    outcome: Err(EngineError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }),
                    terminate: true,
                },
            ),
            InvocationEvent::Closed(exit) => (SettleReason::Closed, settle_closed(exit)),
            InvocationEvent::SpawnFailed(reason) => (
                SettleReason::SpawnFailed,
                Settlement {
                    outcome: Err(EngineError::SpawnFailed(reason)),
                    terminate: true,
                },
            ),
            InvocationEvent::InputWriteFailed(reason) => (
                SettleReason::InputWriteFailed,
                Settlement {
                    outcome: Err(EngineError::InputWriteFailed(reason)),
                    terminate: true,
                },
            ),
        };

        self.state = InvocationState::Settled(reason);
        Some(settlement)
    }
}

/// A non-zero exit still counts as success when stdout carried anything.
fn settle_closed(exit: ProcessExit) -> Settlement {
    if exit.code == 0 || !exit.stdout.is_empty() {
        return Settlement {
            outcome: Ok(exit.stdout),
            terminate: false,
        };
    }

    let stderr = exit.stderr.trim();
    Settlement {
        outcome: Err(EngineError::Exited {
            code: exit.code,
            stderr: if stderr.is_empty() {
                NO_STDERR.to_string()
            } else {
                stderr.to_string()
            },
        }),
        terminate: false,
    }
}
