//! Supervisor for the two capture-and-transcription worker processes.
//!
//! The supervisor is the only owner of the worker process handles. Start is
//! atomic (a partial start is never left running) and stop always resolves
//! every handle: cooperative interrupt, bounded wait, then forced kill.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::session::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKind {
    Mic,
    Speaker,
}

impl WorkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mic => "mic",
            Self::Speaker => "speaker",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Launch command for one worker.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: String,
    pub args: Vec<String>,
}

pub struct WorkerSupervisor {
    mic: WorkerCommand,
    speaker: WorkerCommand,
    env: HashMap<String, String>,
    working_dir: PathBuf,
    settle_delay: Duration,
    children: Vec<(WorkerKind, Child)>,
}

impl WorkerSupervisor {
    pub fn new(
        mic: WorkerCommand,
        speaker: WorkerCommand,
        env: HashMap<String, String>,
        working_dir: PathBuf,
        settle_delay: Duration,
    ) -> Self {
        Self {
            mic,
            speaker,
            env,
            working_dir,
            settle_delay,
            children: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.children.is_empty()
    }

    /// Launches both workers concurrently, then verifies both survived the
    /// settle delay. If either died, the other is terminated before the
    /// error is returned.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        let mut mic = self.spawn(WorkerKind::Mic)?;
        let mut speaker = match self.spawn(WorkerKind::Speaker) {
            Ok(child) => child,
            Err(err) => {
                Self::kill_quietly(WorkerKind::Mic, &mut mic).await;
                return Err(err);
            }
        };

        tokio::time::sleep(self.settle_delay).await;

        if let Some(status) = mic.try_wait().ok().flatten() {
            warn!(
                "Mic worker exited immediately with {:?}, terminating speaker worker",
                status.code()
            );
            Self::kill_quietly(WorkerKind::Speaker, &mut speaker).await;
            return Err(SessionError::WorkerStartFailed {
                which: WorkerKind::Mic,
                code: status.code(),
            });
        }

        if let Some(status) = speaker.try_wait().ok().flatten() {
            warn!(
                "Speaker worker exited immediately with {:?}, terminating mic worker",
                status.code()
            );
            Self::kill_quietly(WorkerKind::Mic, &mut mic).await;
            return Err(SessionError::WorkerStartFailed {
                which: WorkerKind::Speaker,
                code: status.code(),
            });
        }

        info!("Both capture workers running in {:?}", self.working_dir);
        self.children = vec![(WorkerKind::Mic, mic), (WorkerKind::Speaker, speaker)];
        Ok(())
    }

    /// Stops every live worker in two passes: the cooperative interrupt is
    /// delivered to all of them first, then each gets a bounded wait and a
    /// forced kill on expiry. Interrupt delivery never waits on another
    /// worker, so one hung worker cannot delay the others' transcript flush.
    /// Never fails and always clears the handle table.
    pub async fn stop(&mut self, timeout: Duration) {
        let children = std::mem::take(&mut self.children);
        let mut interrupted = Vec::new();

        for (kind, mut child) in children {
            if let Ok(Some(status)) = child.try_wait() {
                info!("{} worker already exited with {:?}", kind, status.code());
                continue;
            }

            if !Self::interrupt(kind, &child) {
                warn!("Interrupt delivery failed for {} worker, killing", kind);
                Self::kill_quietly(kind, &mut child).await;
                continue;
            }

            interrupted.push((kind, child));
        }

        for (kind, mut child) in interrupted {
            match tokio::time::timeout(timeout, child.wait()).await {
                Ok(Ok(status)) => {
                    if status.success() {
                        info!("{} worker exited cleanly", kind);
                    } else {
                        // Non-zero exit is logged, not treated as fatal:
                        // only artifact absence blocks the merge.
                        warn!("{} worker exited with {:?}", kind, status.code());
                    }
                }
                Ok(Err(err)) => {
                    warn!("Error waiting for {} worker: {}, killing", kind, err);
                    Self::kill_quietly(kind, &mut child).await;
                }
                Err(_) => {
                    warn!(
                        "{} worker did not exit within {}s, killing",
                        kind,
                        timeout.as_secs()
                    );
                    Self::kill_quietly(kind, &mut child).await;
                }
            }
        }
    }

    fn spawn(&self, kind: WorkerKind) -> Result<Child, SessionError> {
        let cmd = match kind {
            WorkerKind::Mic => &self.mic,
            WorkerKind::Speaker => &self.speaker,
        };

        info!("Starting {} worker: {} {:?}", kind, cmd.program, cmd.args);

        Command::new(&cmd.program)
            .args(&cmd.args)
            .envs(&self.env)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                error!("Failed to spawn {} worker: {}", kind, err);
                SessionError::WorkerStartFailed {
                    which: kind,
                    code: None,
                }
            })
    }

    /// Delivers the cooperative interrupt (SIGINT) so the worker can flush
    /// its transcript before exiting. Returns false if delivery failed.
    #[cfg(unix)]
    fn interrupt(kind: WorkerKind, child: &Child) -> bool {
        let Some(pid) = child.id() else {
            return false;
        };
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGINT) };
        if rc != 0 {
            warn!("SIGINT delivery to {} worker (pid {}) failed", kind, pid);
            return false;
        }
        info!("Sent interrupt to {} worker (pid {})", kind, pid);
        true
    }

    /// No cooperative interrupt available off unix; callers fall through to
    /// the kill path.
    #[cfg(not(unix))]
    fn interrupt(_kind: WorkerKind, _child: &Child) -> bool {
        false
    }

    /// Forced kill plus wait. A kill cannot hang the way a cooperative stop
    /// can, so this wait is unbounded.
    async fn kill_quietly(kind: WorkerKind, child: &mut Child) {
        if let Err(err) = child.kill().await {
            warn!("Failed to kill {} worker: {}", kind, err);
        }
    }
}
