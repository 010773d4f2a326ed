//! Well-known artifact filenames for one recording session.
//!
//! The workers flush their transcripts to fixed names in the session
//! directory on cooperative interrupt; the merge and summary steps derive
//! their outputs next to them. Existence of each file is always checked,
//! never assumed.

use std::path::{Path, PathBuf};

pub const MIC_TRANSCRIPT: &str = "Mic_transcript.txt";
pub const SPEAKER_TRANSCRIPT: &str = "Speaker_transcript.txt";
pub const COMBINED_TRANSCRIPT: &str = "Combined_transcript.txt";
pub const MEETING_SUMMARY: &str = "Meeting_summary.txt";

#[derive(Debug, Clone)]
pub struct ArtifactSet {
    dir: PathBuf,
}

impl ArtifactSet {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mic_transcript(&self) -> PathBuf {
        self.dir.join(MIC_TRANSCRIPT)
    }

    pub fn speaker_transcript(&self) -> PathBuf {
        self.dir.join(SPEAKER_TRANSCRIPT)
    }

    pub fn combined_transcript(&self) -> PathBuf {
        self.dir.join(COMBINED_TRANSCRIPT)
    }

    pub fn summary(&self) -> PathBuf {
        self.dir.join(MEETING_SUMMARY)
    }

    /// Both worker transcripts exist on disk.
    pub fn transcripts_ready(&self) -> bool {
        self.missing_transcripts().is_empty()
    }

    /// The input transcripts that are currently absent.
    pub fn missing_transcripts(&self) -> Vec<PathBuf> {
        [self.mic_transcript(), self.speaker_transcript()]
            .into_iter()
            .filter(|p| !p.exists())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let set = ArtifactSet::new(PathBuf::from("/tmp/session"));
        assert_eq!(
            set.mic_transcript(),
            PathBuf::from("/tmp/session/Mic_transcript.txt")
        );
        assert_eq!(
            set.summary(),
            PathBuf::from("/tmp/session/Meeting_summary.txt")
        );
    }

    #[test]
    fn test_missing_transcripts_reports_absent_files() {
        let tmp = tempfile::tempdir().unwrap();
        let set = ArtifactSet::new(tmp.path().to_path_buf());

        assert!(!set.transcripts_ready());
        assert_eq!(set.missing_transcripts().len(), 2);

        std::fs::write(set.mic_transcript(), "x").unwrap();
        let missing = set.missing_transcripts();
        assert_eq!(missing, vec![set.speaker_transcript()]);

        std::fs::write(set.speaker_transcript(), "y").unwrap();
        assert!(set.transcripts_ready());
    }
}
