mod merge;
mod parser;
mod timestamp;

pub use merge::MergeEngine;
pub use parser::{Segment, SourceLabel, TranscriptParser};
pub use timestamp::{format_timestamp, parse_timestamp};
