//! Session lifecycle orchestrator.
//!
//! Drives one recording cycle at a time:
//! toggle → record → toggle → stop workers → wait for transcripts →
//! merge → summarize → done.
//!
//! All dependencies are injected via constructor. Every transition runs on
//! the single control loop that calls `handle`, so session state is never
//! mutated concurrently.

use anyhow::Result;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::indicator::{Indicator, IndicatorState};
use crate::summary::SummaryService;
use crate::transcript::MergeEngine;
use crate::workers::WorkerSupervisor;

use super::artifacts::ArtifactSet;
use super::error::SessionError;
use super::status::{SessionPhase, SessionStatusHandle};

/// Events consumed by the controller: user toggles from the API and edge
/// events from the presence monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    Toggle,
    MeetingEntered(String),
    MeetingExited,
}

/// Bounded polling parameters for the artifact wait.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactWait {
    pub interval: Duration,
    pub ceiling: Duration,
}

pub struct SessionController {
    supervisor: WorkerSupervisor,
    merge: MergeEngine,
    summary: Option<Box<dyn SummaryService>>,
    indicator: Box<dyn Indicator>,
    artifacts: ArtifactSet,
    artifact_wait: ArtifactWait,
    stop_timeout: Duration,
    status: SessionStatusHandle,
}

impl SessionController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        supervisor: WorkerSupervisor,
        merge: MergeEngine,
        summary: Option<Box<dyn SummaryService>>,
        indicator: Box<dyn Indicator>,
        artifacts: ArtifactSet,
        artifact_wait: ArtifactWait,
        stop_timeout: Duration,
        status: SessionStatusHandle,
    ) -> Self {
        Self {
            supervisor,
            merge,
            summary,
            indicator,
            artifacts,
            artifact_wait,
            stop_timeout,
            status,
        }
    }

    /// Applies one control event. Returns true when the event ran a stop
    /// pipeline to completion, so the control loop can discard toggles that
    /// queued up behind it while it was blocked here.
    pub async fn handle(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::Toggle => self.toggle().await,
            ControlEvent::MeetingEntered(app) => {
                info!("Meeting app detected: {}", app);
                self.status.set_detected_app(Some(app.clone())).await;
                self.indicator.show(&app);
                false
            }
            ControlEvent::MeetingExited => {
                info!("No meeting app running");
                self.status.set_detected_app(None).await;
                if self.status.get().await.phase == SessionPhase::Idle {
                    self.indicator.hide();
                }
                false
            }
        }
    }

    /// Starts a session if none is active, stops the active one otherwise.
    /// A toggle received mid-pipeline is ignored. Returns true when the
    /// toggle ran the stop pipeline.
    pub async fn toggle(&mut self) -> bool {
        let current = self.status.get().await;
        match current.phase {
            phase if phase.can_start() => {
                if let Err(err) = self.start().await {
                    error!("Failed to start session: {}", err);
                }
                false
            }
            SessionPhase::Recording => {
                self.stop_and_process().await;
                true
            }
            phase => {
                warn!("Toggle ignored while {}", phase.as_str());
                false
            }
        }
    }

    async fn start(&mut self) -> Result<()> {
        std::fs::create_dir_all(self.artifacts.dir())?;

        match self.supervisor.start().await {
            Ok(()) => {
                self.status.start_recording().await;
                self.indicator.set_state(IndicatorState::Recording);
                info!("Recording session started in {:?}", self.artifacts.dir());
                Ok(())
            }
            Err(err) => {
                // Failed starts never leave Idle; the supervisor has
                // already torn down any partial launch.
                self.status.report_start_failure(err.to_string()).await;
                self.indicator.set_state(IndicatorState::Failed);
                Err(err.into())
            }
        }
    }

    /// Runs the full stop pipeline. Stop itself cannot fail the session;
    /// every later step lands in Complete (possibly partial) or Failed.
    async fn stop_and_process(&mut self) {
        self.transition(SessionPhase::Stopping).await;
        self.supervisor.stop(self.stop_timeout).await;

        self.transition(SessionPhase::WaitingArtifacts).await;
        if !self.wait_for_transcripts().await {
            let missing = self.artifacts.missing_transcripts();
            self.fail(SessionError::MissingInputs(missing)).await;
            return;
        }

        self.transition(SessionPhase::Merging).await;
        let merged = self.merge.merge(
            &self.artifacts.mic_transcript(),
            &self.artifacts.speaker_transcript(),
            &self.artifacts.combined_transcript(),
        );
        match merged {
            Ok(count) => info!("Combined transcript has {} segments", count),
            Err(err) => {
                self.fail(err).await;
                return;
            }
        }

        self.transition(SessionPhase::Summarizing).await;
        let partial = match self.summarize().await {
            Ok(()) => false,
            Err(err) => {
                // Summary failure is surfaced but never fatal; the
                // combined transcript is preserved regardless.
                warn!("{}", err);
                true
            }
        };

        self.status.complete(partial).await;
        self.indicator.set_state(if partial {
            IndicatorState::Partial
        } else {
            IndicatorState::Complete
        });
        self.indicator.hide();
        info!(
            "Session complete{}; transcript at {:?}",
            if partial { " (partial)" } else { "" },
            self.artifacts.combined_transcript()
        );
    }

    /// Bounded existence poll for both worker transcripts. Transcription
    /// flush can lag the process exit considerably.
    async fn wait_for_transcripts(&self) -> bool {
        let interval = self.artifact_wait.interval.max(Duration::from_millis(10));
        let attempts =
            (self.artifact_wait.ceiling.as_millis() / interval.as_millis()).max(1) as u64;

        for attempt in 0..attempts {
            tokio::time::sleep(interval).await;
            if self.artifacts.transcripts_ready() {
                return true;
            }
            if attempt % 5 == 0 {
                let missing = self.artifacts.missing_transcripts();
                info!("Still waiting for transcripts: {:?}", missing);
            }
        }

        false
    }

    async fn summarize(&self) -> Result<(), SessionError> {
        let Some(service) = &self.summary else {
            return Err(SessionError::SummaryUnavailable(
                "no summary service configured".to_string(),
            ));
        };

        let combined_path = self.artifacts.combined_transcript();
        let transcript = std::fs::read_to_string(&combined_path)
            .map_err(|err| SessionError::SummaryUnavailable(err.to_string()))?;

        let summary = service
            .summarize(&transcript)
            .await
            .map_err(|err| SessionError::SummaryUnavailable(err.to_string()))?;

        let summary_path = self.artifacts.summary();
        std::fs::write(&summary_path, summary)
            .map_err(|err| SessionError::SummaryUnavailable(err.to_string()))?;

        info!("Summary written to {:?}", summary_path);
        Ok(())
    }

    async fn transition(&self, phase: SessionPhase) {
        self.status.set_phase(phase).await;
        self.indicator.set_state(phase.into());
    }

    async fn fail(&self, err: SessionError) {
        error!("Session failed: {}", err);
        self.status.fail(err.to_string()).await;
        self.indicator.set_state(IndicatorState::Failed);
    }
}
