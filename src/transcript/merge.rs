//! Combines the two worker transcripts into one chronological document.
//!
//! The merge is all-or-nothing: inputs are re-checked immediately before
//! parsing, the combined file is only written once fully rendered, and the
//! source files are deleted only after that write succeeds.

use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use crate::session::SessionError;

use super::parser::{Segment, SourceLabel, TranscriptParser};
use super::timestamp::format_timestamp;

pub struct MergeEngine {
    parser: TranscriptParser,
}

impl MergeEngine {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: TranscriptParser::new()?,
        })
    }

    /// Merges the mic and speaker transcripts into `out_path`.
    ///
    /// Returns the number of merged segments. On success both source files
    /// are deleted. If either input is missing, nothing is written and
    /// nothing is deleted.
    pub fn merge(
        &self,
        mic_path: &Path,
        speaker_path: &Path,
        out_path: &Path,
    ) -> Result<usize, SessionError> {
        let mut missing = Vec::new();
        if !mic_path.exists() {
            missing.push(mic_path.to_path_buf());
        }
        if !speaker_path.exists() {
            missing.push(speaker_path.to_path_buf());
        }
        if !missing.is_empty() {
            return Err(SessionError::MissingInputs(missing));
        }

        let mut segments = self.parser.parse_file(mic_path, SourceLabel::Mic)?;
        segments.extend(self.parser.parse_file(speaker_path, SourceLabel::Speaker)?);

        sort_segments(&mut segments);

        let rendered = render_combined(&segments);
        std::fs::write(out_path, rendered).map_err(|err| SessionError::WriteFailed {
            path: out_path.to_path_buf(),
            source: err,
        })?;

        // Sources are only retired once the combined file is on disk.
        for path in [mic_path, speaker_path] {
            if let Err(err) = std::fs::remove_file(path) {
                warn!("Failed to delete source transcript {:?}: {}", path, err);
            }
        }

        info!(
            "Merged {} segments into {:?}",
            segments.len(),
            out_path
        );
        Ok(segments.len())
    }
}

/// Stable sort by (start, end, source). The label tie-break makes output
/// byte-identical for the same segment multiset regardless of input order.
fn sort_segments(segments: &mut [Segment]) {
    segments.sort_by(|a, b| {
        a.start_secs
            .total_cmp(&b.start_secs)
            .then(a.end_secs.total_cmp(&b.end_secs))
            .then(a.source.cmp(&b.source))
    });
}

fn render_combined(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        out.push_str(&format!(
            "[{} → {}] ({}) {}\n",
            format_timestamp(seg.start_secs),
            format_timestamp(seg.end_secs),
            seg.source,
            seg.text
        ));
    }
    out
}
