use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use super::state::{ReadySession, SessionPhase, SessionState};
use crate::error::SessionError;

/// Token issued by every submit; only the newest one may resolve the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of handing an upload outcome to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Loading -> Ready
    Ready,
    /// Loading -> Error
    Failed(SessionError),
    /// A newer submit owns the session; the outcome was discarded
    Superseded,
}

/// Owner of the canonical `SessionState`
///
/// `begin_submit` and `resolve` are the only transitions. There is no
/// terminal state and nothing is retried automatically.
#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    generation: Generation,
    entered_at: DateTime<Utc>,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            generation: Generation(0),
            entered_at: Utc::now(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// When the current state was entered
    pub fn entered_at(&self) -> DateTime<Utc> {
        self.entered_at
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Any state -> Loading; discards the previous session's payload
    pub fn begin_submit(&mut self) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        self.enter(SessionState::Loading);
        self.generation
    }

    /// Loading -> Ready | Error, if `generation` is still the current one
    pub fn resolve(
        &mut self,
        generation: Generation,
        outcome: Result<ReadySession, SessionError>,
    ) -> Resolution {
        if !self.is_current(generation) {
            info!(
                "Discarding stale result of upload {} (current is {})",
                generation, self.generation
            );
            return Resolution::Superseded;
        }

        if self.phase() != SessionPhase::Loading {
            warn!(
                "Upload {} resolved twice, ignoring (state is {})",
                generation,
                self.phase()
            );
            return Resolution::Superseded;
        }

        match outcome {
            Ok(ready) => {
                self.enter(SessionState::Ready(ready));
                Resolution::Ready
            }
            Err(e) => {
                warn!("Upload {} failed: {}", generation, e);
                self.enter(SessionState::Error {
                    message: e.user_message(),
                });
                Resolution::Failed(e)
            }
        }
    }

    fn enter(&mut self, next: SessionState) {
        info!(
            "Session {}: {} -> {}",
            self.generation,
            self.state.phase(),
            next.phase()
        );
        self.state = next;
        self.entered_at = Utc::now();
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::transcript::Summary;

    fn ready(url: &str) -> ReadySession {
        ReadySession {
            segments: Vec::new(),
            summary: Summary {
                overview: String::new(),
                key_points: Vec::new(),
                participants: Vec::new(),
                duration_label: "N/A".to_string(),
                action_items: Vec::new(),
            },
            media_url: url.to_string(),
            media_duration: None,
        }
    }

    #[test]
    fn test_starts_idle() {
        let machine = SessionMachine::new();
        assert_eq!(machine.state(), &SessionState::Idle);
        assert_eq!(machine.generation().value(), 0);
    }

    #[test]
    fn test_submit_then_ready() {
        let mut machine = SessionMachine::new();

        let gen = machine.begin_submit();
        assert_eq!(machine.phase(), SessionPhase::Loading);

        let resolution = machine.resolve(gen, Ok(ready("http://host/media/a.wav")));
        assert_eq!(resolution, Resolution::Ready);
        assert_eq!(
            machine.state().ready().map(|r| r.media_url.as_str()),
            Some("http://host/media/a.wav")
        );
    }

    #[test]
    fn test_failure_enters_error_with_user_message() {
        let mut machine = SessionMachine::new();
        let gen = machine.begin_submit();

        let err = SessionError::InvalidResponse("missing audioUrl".to_string());
        let resolution = machine.resolve(gen, Err(err.clone()));

        assert_eq!(resolution, Resolution::Failed(err));
        match machine.state() {
            SessionState::Error { message } => {
                assert_eq!(message, "An error occurred during processing. Please try again.");
                assert!(!message.contains("audioUrl"));
            }
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut machine = SessionMachine::new();
        let first = machine.begin_submit();
        let second = machine.begin_submit();

        // Newer upload resolves first, then the old one arrives late
        assert_eq!(machine.resolve(second, Ok(ready("b"))), Resolution::Ready);
        assert_eq!(machine.resolve(first, Ok(ready("a"))), Resolution::Superseded);

        assert_eq!(machine.state().ready().map(|r| r.media_url.as_str()), Some("b"));
    }

    #[test]
    fn test_stale_result_does_not_overwrite_loading() {
        let mut machine = SessionMachine::new();
        let first = machine.begin_submit();
        let _second = machine.begin_submit();

        let err = SessionError::Transport("connection refused".to_string());
        assert_eq!(machine.resolve(first, Err(err)), Resolution::Superseded);
        assert_eq!(machine.phase(), SessionPhase::Loading);
    }

    #[test]
    fn test_new_submit_discards_previous_payload() {
        let mut machine = SessionMachine::new();
        let gen = machine.begin_submit();
        machine.resolve(gen, Ok(ready("a")));

        machine.begin_submit();
        assert_eq!(machine.state(), &SessionState::Loading);
        assert!(machine.state().ready().is_none());
    }

    #[test]
    fn test_error_is_reenterable() {
        let mut machine = SessionMachine::new();
        let gen = machine.begin_submit();
        machine.resolve(gen, Err(SessionError::Transport("502".to_string())));
        assert_eq!(machine.phase(), SessionPhase::Error);

        let gen = machine.begin_submit();
        assert_eq!(machine.phase(), SessionPhase::Loading);
        assert_eq!(machine.resolve(gen, Ok(ready("c"))), Resolution::Ready);
    }

    #[test]
    fn test_double_resolve_is_ignored() {
        let mut machine = SessionMachine::new();
        let gen = machine.begin_submit();
        machine.resolve(gen, Ok(ready("a")));

        let err = SessionError::Transport("late".to_string());
        assert_eq!(machine.resolve(gen, Err(err)), Resolution::Superseded);
        assert_eq!(machine.phase(), SessionPhase::Ready);
    }
}
