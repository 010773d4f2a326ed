use anyhow::{Context, Result};

use crate::cli::MergeCliArgs;
use crate::global;
use crate::session::ArtifactSet;
use crate::transcript::MergeEngine;

/// Runs the merge step standalone, outside a recording session. Useful when
/// a session failed after the workers already flushed their transcripts.
pub fn handle_merge_command(args: MergeCliArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => global::sessions_dir()?,
    };
    let artifacts = ArtifactSet::new(dir);

    let engine = MergeEngine::new()?;
    let count = engine
        .merge(
            &artifacts.mic_transcript(),
            &artifacts.speaker_transcript(),
            &artifacts.combined_transcript(),
        )
        .context("Merge failed")?;

    println!(
        "Merged {} segments into {}",
        count,
        artifacts.combined_transcript().display()
    );
    Ok(())
}
