use serde::{Deserialize, Serialize};
use std::fmt;

use super::transcript::{Summary, TranscriptSegment};

/// Everything a Ready session displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadySession {
    pub segments: Vec<TranscriptSegment>,
    pub summary: Summary,
    /// Absolute locator of the processed audio
    pub media_url: String,
    /// Media length parsed from the duration label, if it had one
    pub media_duration: Option<f64>,
}

/// Canonical state of the current upload-to-review cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    /// Upload in flight
    Loading,
    Ready(ReadySession),
    Error { message: String },
}

/// Payload-free discriminant of `SessionState`, for logs and notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// What the transcript pane has to show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranscriptView<'a> {
    Loading,
    /// Nothing to show yet: no session, a failed one, or an empty transcript
    Empty,
    Segments(&'a [TranscriptSegment]),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Loading => SessionPhase::Loading,
            SessionState::Ready(_) => SessionPhase::Ready,
            SessionState::Error { .. } => SessionPhase::Error,
        }
    }

    pub fn ready(&self) -> Option<&ReadySession> {
        match self {
            SessionState::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn transcript_view(&self) -> TranscriptView<'_> {
        match self {
            SessionState::Loading => TranscriptView::Loading,
            SessionState::Ready(ready) if !ready.segments.is_empty() => {
                TranscriptView::Segments(&ready.segments)
            }
            _ => TranscriptView::Empty,
        }
    }
}

impl TranscriptView<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptView::Loading => "loading",
            TranscriptView::Empty => "empty",
            TranscriptView::Segments(_) => "segments",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Loading => "Loading",
            SessionPhase::Ready => "Ready",
            SessionPhase::Error => "Error",
        };
        f.write_str(name)
    }
}
