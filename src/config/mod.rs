use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub presence: PresenceConfig,
    pub workers: WorkersConfig,
    pub artifacts: ArtifactsConfig,
    pub summary: SummaryConfig,
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Seconds between process-table scans.
    pub poll_interval_seconds: u64,
    /// Meeting applications to detect, in match priority order.
    pub apps: Vec<AppRule>,
    /// Process names that never count as a match on their own. A browser
    /// being open says nothing about whether a meeting is happening.
    pub excluded_processes: Vec<String>,
}

/// One meeting application and the process names that identify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRule {
    pub name: String,
    pub processes: Vec<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 2,
            apps: vec![
                AppRule {
                    name: "Zoom".to_string(),
                    processes: vec![
                        "zoom.exe".to_string(),
                        "cpthost.exe".to_string(),
                        "zoom.us".to_string(),
                        "zoom".to_string(),
                    ],
                },
                AppRule {
                    name: "Teams".to_string(),
                    processes: vec![
                        "ms-teams.exe".to_string(),
                        "teams.exe".to_string(),
                        "ms-teams".to_string(),
                        "teams".to_string(),
                    ],
                },
                AppRule {
                    name: "Google Meet".to_string(),
                    processes: vec![
                        "chrome.exe".to_string(),
                        "msedge.exe".to_string(),
                        "firefox.exe".to_string(),
                    ],
                },
            ],
            excluded_processes: vec![
                "chrome.exe".to_string(),
                "msedge.exe".to_string(),
                "firefox.exe".to_string(),
                "chrome".to_string(),
                "msedge".to_string(),
                "firefox".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Command for the microphone capture worker.
    pub mic_command: String,
    pub mic_args: Vec<String>,
    /// Command for the speaker (system audio) capture worker.
    pub speaker_command: String,
    pub speaker_args: Vec<String>,
    /// Extra environment variables passed to both workers.
    pub env: HashMap<String, String>,
    /// Working directory for workers and artifacts. Defaults to the
    /// sessions directory under the data dir.
    pub working_dir: Option<PathBuf>,
    /// Seconds to wait after spawning before checking both workers survived.
    pub settle_delay_seconds: u64,
    /// Per-worker seconds to wait for a clean exit after the interrupt
    /// before escalating to a kill.
    pub stop_timeout_seconds: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        let mut env = HashMap::new();
        env.insert("PYTHONIOENCODING".to_string(), "utf-8".to_string());
        Self {
            mic_command: "python3".to_string(),
            mic_args: vec!["mic_worker.py".to_string()],
            speaker_command: "python3".to_string(),
            speaker_args: vec!["speaker_worker.py".to_string()],
            env,
            working_dir: None,
            settle_delay_seconds: 2,
            stop_timeout_seconds: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Seconds between existence checks for the transcript files.
    pub poll_interval_seconds: u64,
    /// Overall ceiling in seconds to wait for both transcripts to appear
    /// after the workers stop. Transcription flush can take a while.
    pub wait_timeout_seconds: u64,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 2,
            wait_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Chat-completions style endpoint for summary generation.
    pub endpoint: String,
    /// API key. Summaries are skipped (session completes as partial) when
    /// this is unset.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3838 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Emit desktop notifications on status transitions when a notifier
    /// is available.
    pub notifications: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notifications: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_presence_excludes_browsers() {
        let config = PresenceConfig::default();
        assert!(config
            .excluded_processes
            .iter()
            .any(|p| p == "chrome.exe"));
        // Google Meet only lists browser identifiers, so the defaults can
        // never match it; that is deliberate.
        let meet = config.apps.iter().find(|a| a.name == "Google Meet").unwrap();
        assert!(meet
            .processes
            .iter()
            .all(|p| config.excluded_processes.contains(p)));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.workers.stop_timeout_seconds,
            config.workers.stop_timeout_seconds
        );
        assert_eq!(parsed.artifacts.wait_timeout_seconds, 120);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[api]\nport = 4000\n").unwrap();
        assert_eq!(parsed.api.port, 4000);
        assert_eq!(parsed.presence.poll_interval_seconds, 2);
        assert_eq!(parsed.workers.settle_delay_seconds, 2);
    }
}
