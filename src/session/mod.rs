//! Session state management
//!
//! This module owns the state of a single upload-to-review cycle:
//! - `SessionState` and its payload types (transcript segments, summary)
//! - `SessionMachine`, the transition function guarded by a generation token
//! - `Notice`, the user-visible notifications tied to transitions

mod machine;
mod notice;
mod state;
mod transcript;

pub use machine::{Generation, Resolution, SessionMachine};
pub use notice::Notice;
pub use state::{ReadySession, SessionPhase, SessionState, TranscriptView};
pub use transcript::{normalize_segments, parse_duration_label, Summary, TranscriptSegment};
