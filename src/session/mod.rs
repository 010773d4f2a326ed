mod artifacts;
mod controller;
mod error;
mod status;

pub use artifacts::{
    ArtifactSet, COMBINED_TRANSCRIPT, MEETING_SUMMARY, MIC_TRANSCRIPT, SPEAKER_TRANSCRIPT,
};
pub use controller::{ArtifactWait, ControlEvent, SessionController};
pub use error::SessionError;
pub use status::{SessionPhase, SessionState, SessionStatusHandle};
