//! Transcript-audio synchronization
//!
//! - `TranscriptSynchronizer`: active-segment lookup and click-to-seek targets
//! - `ReviewSession`: clock plus tracker task scoped to one Ready session

mod review;
mod synchronizer;

pub use review::ReviewSession;
pub use synchronizer::{PlaybackSnapshot, TranscriptSynchronizer};
