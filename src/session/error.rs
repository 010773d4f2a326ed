use std::path::PathBuf;
use thiserror::Error;

use crate::workers::WorkerKind;

/// Session-level failure taxonomy. Everything here is user-visible; parse
/// level problems (malformed lines) are recovered locally and never surface.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A capture worker exited during the settle window. The start attempt
    /// is aborted and the surviving worker has already been terminated.
    #[error("{which} worker failed to start (exit code {code:?})")]
    WorkerStartFailed {
        which: WorkerKind,
        code: Option<i32>,
    },

    /// Expected transcript artifacts were absent after the wait ceiling, or
    /// vanished before the merge could run.
    #[error("missing transcript files: {}", format_paths(.0))]
    MissingInputs(Vec<PathBuf>),

    /// A present file could not be opened for parsing.
    #[error("could not read {path:?}: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output artifact could not be written. Source files are never
    /// deleted when this happens.
    #[error("could not write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external summary call failed or timed out. Non-fatal: the
    /// session still completes, flagged partial.
    #[error("summary generation failed: {0}")]
    SummaryUnavailable(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_inputs_names_paths() {
        let err = SessionError::MissingInputs(vec![
            PathBuf::from("/tmp/Mic_transcript.txt"),
            PathBuf::from("/tmp/Speaker_transcript.txt"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("Mic_transcript.txt"));
        assert!(msg.contains("Speaker_transcript.txt"));
    }

    #[test]
    fn test_worker_start_failed_message() {
        let err = SessionError::WorkerStartFailed {
            which: WorkerKind::Mic,
            code: Some(1),
        };
        assert!(err.to_string().contains("mic"));
    }
}
