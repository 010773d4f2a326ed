//! Meeting application presence detection.
//!
//! A background task polls the process table on a fixed interval and posts
//! edge-triggered events: one when a meeting app first appears, one when it
//! disappears. Steady-state presence is silent. Generic browser processes
//! never count as a match on their own — a browser being open is not
//! evidence of a meeting.

use std::collections::HashSet;
use std::time::Duration;
use sysinfo::System;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{AppRule, PresenceConfig};
use crate::session::ControlEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    Entered(String),
    Exited,
}

/// Pure edge-detection over a stream of poll results.
#[derive(Debug, Default)]
pub struct EdgeTracker {
    present: bool,
}

impl EdgeTracker {
    pub fn observe(&mut self, detected: Option<String>) -> Option<PresenceEvent> {
        match (detected, self.present) {
            (Some(app), false) => {
                self.present = true;
                Some(PresenceEvent::Entered(app))
            }
            (None, true) => {
                self.present = false;
                Some(PresenceEvent::Exited)
            }
            _ => None,
        }
    }
}

pub struct PresenceMonitor {
    rules: Vec<AppRule>,
    excluded: HashSet<String>,
    poll_interval: Duration,
    system: System,
    tracker: EdgeTracker,
}

impl PresenceMonitor {
    pub fn new(config: &PresenceConfig) -> Self {
        Self {
            rules: config.apps.clone(),
            excluded: config
                .excluded_processes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            poll_interval: Duration::from_secs(config.poll_interval_seconds.max(1)),
            system: System::new(),
            tracker: EdgeTracker::default(),
        }
    }

    /// Runs the poll loop, forwarding edge events to the controller channel
    /// until the receiver goes away.
    pub async fn run(mut self, tx: mpsc::Sender<ControlEvent>) {
        loop {
            tokio::time::sleep(self.poll_interval).await;

            let detected = self.detect();
            let Some(event) = self.tracker.observe(detected) else {
                continue;
            };

            let control = match event {
                PresenceEvent::Entered(app) => ControlEvent::MeetingEntered(app),
                PresenceEvent::Exited => ControlEvent::MeetingExited,
            };

            if tx.send(control).await.is_err() {
                warn!("Controller channel closed, stopping presence monitor");
                return;
            }
        }
    }

    /// Scans the process table once and returns the first matching app name.
    pub fn detect(&mut self) -> Option<String> {
        self.system
            .refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        let running: HashSet<String> = self
            .system
            .processes()
            .values()
            .map(|p| p.name().to_string_lossy().to_lowercase())
            .collect();

        let detected = match_app(&self.rules, &self.excluded, &running);
        if let Some(app) = &detected {
            debug!("Meeting app detected: {}", app);
        }
        detected
    }
}

/// Matches the rule table against a lowercased process-name snapshot.
/// Excluded identifiers (browsers) are skipped even when listed for an app.
fn match_app(
    rules: &[AppRule],
    excluded: &HashSet<String>,
    running: &HashSet<String>,
) -> Option<String> {
    for rule in rules {
        for process in &rule.processes {
            let process = process.to_lowercase();
            if excluded.contains(&process) {
                continue;
            }
            if running.contains(&process) {
                return Some(rule.name.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<AppRule> {
        PresenceConfig::default().apps
    }

    fn excluded() -> HashSet<String> {
        PresenceConfig::default()
            .excluded_processes
            .into_iter()
            .collect()
    }

    fn snapshot(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_lowercase()).collect()
    }

    #[test]
    fn test_match_known_app() {
        let running = snapshot(&["explorer.exe", "zoom.exe"]);
        assert_eq!(
            match_app(&rules(), &excluded(), &running),
            Some("Zoom".to_string())
        );
    }

    #[test]
    fn test_browser_alone_never_matches() {
        let running = snapshot(&["chrome.exe", "msedge.exe", "firefox.exe"]);
        assert_eq!(match_app(&rules(), &excluded(), &running), None);
    }

    #[test]
    fn test_no_meeting_app_running() {
        let running = snapshot(&["explorer.exe", "code.exe"]);
        assert_eq!(match_app(&rules(), &excluded(), &running), None);
    }

    #[test]
    fn test_teams_matches() {
        let running = snapshot(&["ms-teams.exe"]);
        assert_eq!(
            match_app(&rules(), &excluded(), &running),
            Some("Teams".to_string())
        );
    }

    #[test]
    fn test_edge_tracker_single_enter_event() {
        let mut tracker = EdgeTracker::default();

        assert_eq!(
            tracker.observe(Some("Zoom".to_string())),
            Some(PresenceEvent::Entered("Zoom".to_string()))
        );
        // Steady-state presence emits nothing
        assert_eq!(tracker.observe(Some("Zoom".to_string())), None);
        assert_eq!(tracker.observe(Some("Zoom".to_string())), None);
    }

    #[test]
    fn test_edge_tracker_single_exit_event() {
        let mut tracker = EdgeTracker::default();
        tracker.observe(Some("Zoom".to_string()));

        assert_eq!(tracker.observe(None), Some(PresenceEvent::Exited));
        // Steady-state absence emits nothing
        assert_eq!(tracker.observe(None), None);
    }

    #[test]
    fn test_edge_tracker_full_cycle() {
        let mut tracker = EdgeTracker::default();

        assert_eq!(tracker.observe(None), None);
        assert!(matches!(
            tracker.observe(Some("Teams".to_string())),
            Some(PresenceEvent::Entered(_))
        ));
        assert_eq!(tracker.observe(Some("Teams".to_string())), None);
        assert_eq!(tracker.observe(None), Some(PresenceEvent::Exited));
        assert!(matches!(
            tracker.observe(Some("Teams".to_string())),
            Some(PresenceEvent::Entered(_))
        ));
    }
}
