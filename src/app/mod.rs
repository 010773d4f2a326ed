use crate::api::ApiServer;
use crate::config::Config;
use crate::global;
use crate::indicator;
use crate::presence::PresenceMonitor;
use crate::session::{
    ArtifactSet, ArtifactWait, ControlEvent, SessionController, SessionStatusHandle,
};
use crate::summary::{OpenAiSummaryService, SummaryService};
use crate::transcript::MergeEngine;
use crate::workers::{WorkerCommand, WorkerSupervisor};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn run_service() -> Result<()> {
    info!("Starting huddle service");

    let config = Config::load()?;

    let (tx, mut rx) = mpsc::channel::<ControlEvent>(16);

    let session_dir = match &config.workers.working_dir {
        Some(dir) => dir.clone(),
        None => global::sessions_dir()?,
    };
    let artifacts = ArtifactSet::new(session_dir);

    let supervisor = WorkerSupervisor::new(
        WorkerCommand {
            program: config.workers.mic_command.clone(),
            args: config.workers.mic_args.clone(),
        },
        WorkerCommand {
            program: config.workers.speaker_command.clone(),
            args: config.workers.speaker_args.clone(),
        },
        config.workers.env.clone(),
        artifacts.dir().to_path_buf(),
        Duration::from_secs(config.workers.settle_delay_seconds),
    );

    let summary = OpenAiSummaryService::from_config(&config.summary)?
        .map(|s| Box::new(s) as Box<dyn SummaryService>);
    if summary.is_none() {
        warn!("No summary API key configured; sessions will complete without summaries");
    }

    let status = SessionStatusHandle::default();
    let controller = SessionController::new(
        supervisor,
        MergeEngine::new()?,
        summary,
        indicator::from_config(&config.ui),
        artifacts,
        ArtifactWait {
            interval: Duration::from_secs(config.artifacts.poll_interval_seconds),
            ceiling: Duration::from_secs(config.artifacts.wait_timeout_seconds),
        },
        Duration::from_secs(config.workers.stop_timeout_seconds),
        status.clone(),
    );

    let monitor = PresenceMonitor::new(&config.presence);
    tokio::spawn(monitor.run(tx.clone()));

    let api_server = ApiServer::new(tx.clone(), status.clone(), config.api.port);
    let port = config.api.port;
    tokio::spawn(async move {
        if let Err(e) = api_server.start().await {
            error!("API server failed: {}", e);
        }
    });

    info!("huddle is ready!");
    info!("Bind a hotkey to toggle recording:");
    info!("curl -X POST http://127.0.0.1:{}/toggle", port);

    run_control_loop(rx, controller).await;

    Ok(())
}

/// Single control loop: API toggles and presence edges are serialized here,
/// so session state never sees concurrent transitions. Toggles that queued
/// up while a stop pipeline was running were issued against a session that
/// no longer exists and are dropped once the pipeline finishes.
pub async fn run_control_loop(
    mut rx: mpsc::Receiver<ControlEvent>,
    mut controller: SessionController,
) {
    while let Some(event) = rx.recv().await {
        if controller.handle(event).await {
            discard_stale_toggles(&mut rx, &mut controller).await;
        }
    }
}

async fn discard_stale_toggles(
    rx: &mut mpsc::Receiver<ControlEvent>,
    controller: &mut SessionController,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            ControlEvent::Toggle => {
                warn!("Ignoring toggle received while the session was finishing");
            }
            other => {
                controller.handle(other).await;
            }
        }
    }
}
