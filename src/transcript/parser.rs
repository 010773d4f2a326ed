use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::session::SessionError;

use super::timestamp::parse_timestamp;

/// Which worker produced a segment. The ordering (Mic < Speaker) is the
/// final tie-break in the merge sort, so it must stay fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceLabel {
    Mic,
    Speaker,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mic => "MIC",
            Self::Speaker => "SPEAKER",
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed utterance. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Segment {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
    pub source: SourceLabel,
}

/// Extracts ordered segments from a worker transcript file.
pub struct TranscriptParser {
    // Mic dialect: [00:00:00.000 → 00:00:18.500] text
    hms_pattern: Regex,
    // Speaker dialect: [00:06.00 → 00:10.00] text
    ms_pattern: Regex,
}

impl TranscriptParser {
    pub fn new() -> Result<Self> {
        let hms_pattern =
            Regex::new(r"\[(\d{2}:\d{2}:\d{2}\.\d+)\s*→\s*(\d{2}:\d{2}:\d{2}\.\d+)\]\s*(.*)")?;
        let ms_pattern =
            Regex::new(r"\[(\d{2}:\d{2}\.\d+)\s*→\s*(\d{2}:\d{2}\.\d+)\]\s*(.*)")?;

        Ok(Self {
            hms_pattern,
            ms_pattern,
        })
    }

    /// Parses a transcript file, tagging every segment with `source`.
    ///
    /// Fails only if the file cannot be read; malformed lines are skipped.
    pub fn parse_file(
        &self,
        path: &Path,
        source: SourceLabel,
    ) -> Result<Vec<Segment>, SessionError> {
        let content =
            std::fs::read_to_string(path).map_err(|err| SessionError::FileUnreadable {
                path: path.to_path_buf(),
                source: err,
            })?;

        let segments = self.parse_str(&content, source);
        debug!(
            "Parsed {} segments from {:?} ({})",
            segments.len(),
            path,
            source
        );
        Ok(segments)
    }

    /// Parses transcript text, preserving line order.
    pub fn parse_str(&self, content: &str, source: SourceLabel) -> Vec<Segment> {
        let mut segments = Vec::new();

        for line in content.lines() {
            let line = line.trim();

            let captures = self
                .hms_pattern
                .captures(line)
                .or_else(|| self.ms_pattern.captures(line));

            let Some(caps) = captures else {
                continue;
            };

            segments.push(Segment {
                start_secs: parse_timestamp(&caps[1]),
                end_secs: parse_timestamp(&caps[2]),
                text: caps[3].to_string(),
                source,
            });
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mic_dialect() {
        let parser = TranscriptParser::new().unwrap();
        let segments = parser.parse_str(
            "[00:00:00.000 → 00:00:18.500] Hello there",
            SourceLabel::Mic,
        );

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_secs, 0.0);
        assert_eq!(segments[0].end_secs, 18.5);
        assert_eq!(segments[0].text, "Hello there");
        assert_eq!(segments[0].source, SourceLabel::Mic);
    }

    #[test]
    fn test_parse_speaker_dialect() {
        let parser = TranscriptParser::new().unwrap();
        let segments =
            parser.parse_str("[00:06.00 → 00:10.00] Quick reply", SourceLabel::Speaker);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_secs, 6.0);
        assert_eq!(segments[0].end_secs, 10.0);
        assert_eq!(segments[0].source, SourceLabel::Speaker);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let parser = TranscriptParser::new().unwrap();
        let content = "\
garbage line
[00:00:01.000 → 00:00:02.000] first
not a timestamp at all
[00:03.00 → 00:04.00] second

[broken → 00:00:05.000] also skipped";
        let segments = parser.parse_str(content, SourceLabel::Mic);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "first");
        assert_eq!(segments[1].text, "second");
    }

    #[test]
    fn test_file_order_preserved() {
        let parser = TranscriptParser::new().unwrap();
        let content = "\
[00:10.00 → 00:12.00] later
[00:01.00 → 00:02.00] earlier";
        let segments = parser.parse_str(content, SourceLabel::Speaker);

        // Parser preserves file order; sorting is the merge engine's job
        assert_eq!(segments[0].text, "later");
        assert_eq!(segments[1].text, "earlier");
    }

    #[test]
    fn test_empty_text_allowed() {
        let parser = TranscriptParser::new().unwrap();
        let segments = parser.parse_str("[00:01.00 → 00:02.00]", SourceLabel::Mic);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "");
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let parser = TranscriptParser::new().unwrap();
        let err = parser
            .parse_file(Path::new("/nonexistent/transcript.txt"), SourceLabel::Mic)
            .unwrap_err();
        assert!(matches!(err, SessionError::FileUnreadable { .. }));
    }

    #[test]
    fn test_source_label_ordering() {
        assert!(SourceLabel::Mic < SourceLabel::Speaker);
        assert_eq!(SourceLabel::Mic.as_str(), "MIC");
        assert_eq!(SourceLabel::Speaker.as_str(), "SPEAKER");
    }
}
