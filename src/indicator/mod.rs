//! Status indicator capability interface.
//!
//! The controller reports status transitions through this trait and never
//! touches a concrete presentation dependency. The desktop implementation
//! shells out to notify-send when available; headless runs and tests use
//! the null implementation.

use std::process::{Command, Stdio};
use tracing::{debug, info, warn};
use which::which;

use crate::config::UiConfig;
use crate::session::SessionPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Idle,
    Recording,
    Stopping,
    Processing,
    Merging,
    Summarizing,
    Complete,
    Partial,
    Failed,
}

impl IndicatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::Processing => "processing",
            Self::Merging => "merging",
            Self::Summarizing => "summarizing",
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Recording => "Recording...",
            Self::Stopping => "Stopping workers...",
            Self::Processing => "Waiting for transcripts...",
            Self::Merging => "Merging transcripts...",
            Self::Summarizing => "Generating summary...",
            Self::Complete => "Session complete",
            Self::Partial => "Session complete (no summary)",
            Self::Failed => "Session failed",
        }
    }
}

impl From<SessionPhase> for IndicatorState {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Idle => Self::Idle,
            SessionPhase::Recording => Self::Recording,
            SessionPhase::Stopping => Self::Stopping,
            SessionPhase::WaitingArtifacts => Self::Processing,
            SessionPhase::Merging => Self::Merging,
            SessionPhase::Summarizing => Self::Summarizing,
            SessionPhase::Complete => Self::Complete,
            SessionPhase::Failed => Self::Failed,
        }
    }
}

pub trait Indicator: Send + Sync {
    /// A meeting app was detected; surface the indicator.
    fn show(&self, app: &str);
    /// No meeting app present; hide the indicator.
    fn hide(&self);
    /// Report a status transition.
    fn set_state(&self, state: IndicatorState);
}

/// Desktop notifications via notify-send. Fire and forget: presentation
/// must never block or fail a session.
pub struct DesktopIndicator;

impl DesktopIndicator {
    fn notify(&self, summary: &str, body: &str) {
        let result = Command::new("notify-send")
            .arg("--app-name=huddle")
            .arg(summary)
            .arg(body)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        if let Err(err) = result {
            warn!("notify-send failed: {}", err);
        }
    }
}

impl Indicator for DesktopIndicator {
    fn show(&self, app: &str) {
        self.notify("Meeting detected", &format!("{app} is running"));
    }

    fn hide(&self) {
        debug!("Indicator hidden");
    }

    fn set_state(&self, state: IndicatorState) {
        self.notify("huddle", state.message());
    }
}

/// No-op indicator for headless runs and tests.
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn show(&self, app: &str) {
        debug!("indicator show: {}", app);
    }

    fn hide(&self) {
        debug!("indicator hide");
    }

    fn set_state(&self, state: IndicatorState) {
        debug!("indicator state: {}", state.as_str());
    }
}

/// Picks the best available indicator for this environment.
pub fn from_config(ui: &UiConfig) -> Box<dyn Indicator> {
    if ui.notifications && which("notify-send").is_ok() {
        info!("Using desktop notifications for status");
        Box::new(DesktopIndicator)
    } else {
        info!("Desktop notifier unavailable, status via logs only");
        Box::new(NullIndicator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_to_indicator_state() {
        assert_eq!(
            IndicatorState::from(SessionPhase::WaitingArtifacts),
            IndicatorState::Processing
        );
        assert_eq!(
            IndicatorState::from(SessionPhase::Recording),
            IndicatorState::Recording
        );
    }

    #[test]
    fn test_state_labels_are_stable() {
        assert_eq!(IndicatorState::Partial.as_str(), "partial");
        assert_eq!(IndicatorState::Merging.as_str(), "merging");
    }
}
