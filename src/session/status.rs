//! Session status types and shared state handle.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Phase of a recording session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Recording,
    Stopping,
    WaitingArtifacts,
    Merging,
    Summarizing,
    Complete,
    Failed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::WaitingArtifacts => "waiting_artifacts",
            Self::Merging => "merging",
            Self::Summarizing => "summarizing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// A new recording cycle may only begin from these phases.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Complete | Self::Failed)
    }
}

/// Current session state, readable by API handlers.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Meeting app currently detected by the presence monitor, if any.
    pub detected_app: Option<String>,
    /// Set when the session completed without a summary artifact.
    pub partial: bool,
    pub last_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            started_at: None,
            detected_app: None,
            partial: false,
            last_error: None,
        }
    }
}

impl SessionState {
    /// Duration since recording started, in seconds.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.started_at.map(|started| {
            let elapsed = chrono::Utc::now() - started;
            elapsed.num_seconds().max(0) as u64
        })
    }
}

/// Thread-safe handle shared between the controller and API handlers.
#[derive(Clone, Default)]
pub struct SessionStatusHandle {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStatusHandle {
    pub async fn get(&self) -> SessionState {
        self.inner.lock().await.clone()
    }

    pub async fn start_recording(&self) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Recording;
        state.started_at = Some(chrono::Utc::now());
        state.partial = false;
        state.last_error = None;
    }

    pub async fn set_phase(&self, phase: SessionPhase) {
        let mut state = self.inner.lock().await;
        state.phase = phase;
    }

    pub async fn set_detected_app(&self, app: Option<String>) {
        let mut state = self.inner.lock().await;
        state.detected_app = app;
    }

    /// Start attempt failed: the session never left Idle, but the error is
    /// recorded for the status surface.
    pub async fn report_start_failure(&self, error: String) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Idle;
        state.started_at = None;
        state.last_error = Some(error);
    }

    pub async fn complete(&self, partial: bool) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Complete;
        state.partial = partial;
    }

    pub async fn fail(&self, error: String) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Failed;
        state.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_phase_as_str() {
        assert_eq!(SessionPhase::Idle.as_str(), "idle");
        assert_eq!(SessionPhase::WaitingArtifacts.as_str(), "waiting_artifacts");
        assert_eq!(SessionPhase::Complete.as_str(), "complete");
    }

    #[test]
    fn test_can_start_only_from_terminal_phases() {
        assert!(SessionPhase::Idle.can_start());
        assert!(SessionPhase::Complete.can_start());
        assert!(SessionPhase::Failed.can_start());
        assert!(!SessionPhase::Recording.can_start());
        assert!(!SessionPhase::Stopping.can_start());
        assert!(!SessionPhase::WaitingArtifacts.can_start());
        assert!(!SessionPhase::Merging.can_start());
        assert!(!SessionPhase::Summarizing.can_start());
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&SessionPhase::WaitingArtifacts).unwrap();
        assert_eq!(json, "\"waiting_artifacts\"");

        let parsed: SessionPhase = serde_json::from_str("\"recording\"").unwrap();
        assert_eq!(parsed, SessionPhase::Recording);
    }

    #[tokio::test]
    async fn test_status_handle_start_recording() {
        let handle = SessionStatusHandle::default();
        handle.start_recording().await;

        let state = handle.get().await;
        assert_eq!(state.phase, SessionPhase::Recording);
        assert!(state.started_at.is_some());
        assert!(!state.partial);
    }

    #[tokio::test]
    async fn test_status_handle_start_failure_stays_idle() {
        let handle = SessionStatusHandle::default();
        handle
            .report_start_failure("mic worker failed to start".to_string())
            .await;

        let state = handle.get().await;
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn test_status_handle_partial_complete() {
        let handle = SessionStatusHandle::default();
        handle.start_recording().await;
        handle.complete(true).await;

        let state = handle.get().await;
        assert_eq!(state.phase, SessionPhase::Complete);
        assert!(state.partial);
    }

    #[tokio::test]
    async fn test_status_handle_lifecycle() {
        let handle = SessionStatusHandle::default();

        handle.start_recording().await;
        assert_eq!(handle.get().await.phase, SessionPhase::Recording);

        handle.set_phase(SessionPhase::Stopping).await;
        assert_eq!(handle.get().await.phase, SessionPhase::Stopping);

        handle.set_phase(SessionPhase::WaitingArtifacts).await;
        handle.set_phase(SessionPhase::Merging).await;
        handle.set_phase(SessionPhase::Summarizing).await;

        handle.complete(false).await;
        let state = handle.get().await;
        assert_eq!(state.phase, SessionPhase::Complete);
        assert!(!state.partial);
    }
}
