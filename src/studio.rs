use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::api::ProcessingClient;
use crate::audio::PlayerFactory;
use crate::error::SessionError;
use crate::session::{Generation, Notice, Resolution, SessionMachine, SessionPhase, SessionState};
use crate::sync::{PlaybackSnapshot, ReviewSession};
use crate::upload::{FileSelection, UploadOrchestrator};

/// How a submit ended for the caller that issued it
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Session as it was when this upload resolved it
    Ready(SessionSnapshot),
    /// A later submit took over; this upload's result was discarded
    Superseded,
}

/// Point-in-time view of the session for a presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub generation: Generation,
    pub entered_at: DateTime<Utc>,
    pub transcript_view: &'static str,
    pub session: SessionState,
}

struct StudioInner {
    machine: SessionMachine,
    review: Option<ReviewSession>,
}

/// Single entry point for the presentation layer
///
/// Owns the session state machine and the resources of the current Ready
/// session. User intents (file dropped, segment clicked) come in through
/// `submit` and `click_segment`; notices go out on a broadcast channel.
pub struct Studio {
    orchestrator: UploadOrchestrator,
    players: Arc<dyn PlayerFactory>,
    inner: Mutex<StudioInner>,
    notices: broadcast::Sender<Notice>,
}

impl SubmitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, SubmitOutcome::Ready(_))
    }
}

impl StudioInner {
    fn snapshot(&self) -> SessionSnapshot {
        let state = self.machine.state();

        SessionSnapshot {
            generation: self.machine.generation(),
            entered_at: self.machine.entered_at(),
            transcript_view: state.transcript_view().kind(),
            session: state.clone(),
        }
    }
}

impl Studio {
    pub fn new(client: Arc<dyn ProcessingClient>, players: Arc<dyn PlayerFactory>) -> Self {
        let (notices, _) = broadcast::channel(64);

        Self {
            orchestrator: UploadOrchestrator::new(client),
            players,
            inner: Mutex::new(StudioInner {
                machine: SessionMachine::new(),
                review: None,
            }),
            notices,
        }
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.machine.state().clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.machine.phase()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Upload the first file of `selection` and display its result
    ///
    /// An empty selection is rejected without touching the session. A
    /// newer submit supersedes this one: its result is then discarded and
    /// `SubmitOutcome::Superseded` is returned.
    pub async fn submit(&self, selection: FileSelection) -> Result<SubmitOutcome, SessionError> {
        let Some((file, ignored)) = selection.into_first() else {
            info!("Submit rejected: no file selected");
            self.notify(Notice::NoFileSelected);
            return Err(SessionError::NoFileSelected);
        };

        if ignored > 0 {
            warn!(
                "{} extra file(s) in selection ignored, processing {}",
                ignored, file.name
            );
            self.notify(Notice::ExtraFilesIgnored { count: ignored });
        }

        let generation = {
            let mut inner = self.inner.lock().await;
            // Release the previous session's clock before anything new is mounted
            inner.review.take();
            inner.machine.begin_submit()
        };
        self.notify(Notice::ProcessingStarted);

        let outcome = self.orchestrator.process(file).await;

        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        match inner.machine.resolve(generation, outcome) {
            Resolution::Ready => {
                if let Some(ready) = inner.machine.state().ready() {
                    let review = ReviewSession::mount(generation, ready, self.players.as_ref());
                    if let Some(fault) = review.playback_fault() {
                        let warning = SessionError::PlaybackFault(fault.clone());
                        self.notify(Notice::PlaybackWarning {
                            message: warning.user_message(),
                        });
                    }
                    inner.review = Some(review);
                }
                self.notify(Notice::ProcessingComplete);
                Ok(SubmitOutcome::Ready(inner.snapshot()))
            }
            Resolution::Failed(e) => {
                error!("Upload {} failed: {}", generation, e);
                self.notify(Notice::ProcessingFailed {
                    message: e.user_message(),
                });
                Err(e)
            }
            Resolution::Superseded => Ok(SubmitOutcome::Superseded),
        }
    }

    /// Seek to segment `index` of the Ready session and start playback
    ///
    /// `Ok(None)` (no-op) when no session is Ready or the index is out of
    /// range. A playback fault is reported as a warning; the session stays.
    pub async fn click_segment(&self, index: usize) -> Result<Option<f64>, SessionError> {
        let mut inner = self.inner.lock().await;

        let Some(review) = inner.review.as_mut() else {
            debug!("Segment {} clicked with no Ready session, ignoring", index);
            return Ok(None);
        };

        match review.click_segment(index) {
            Ok(position) => Ok(position),
            Err(fault) => {
                let e = SessionError::PlaybackFault(fault);
                warn!("Segment {} playback failed: {}", index, e);
                self.notify(Notice::PlaybackWarning {
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    /// Latest position and active segment of the Ready session
    pub async fn playback(&self) -> Option<PlaybackSnapshot> {
        let inner = self.inner.lock().await;
        inner.review.as_ref().map(|review| review.playback())
    }

    /// Follow position updates of the current Ready session
    pub async fn watch_playback(&self) -> Option<watch::Receiver<PlaybackSnapshot>> {
        let inner = self.inner.lock().await;
        inner.review.as_ref().map(|review| review.watch_playback())
    }

    /// Release the current session's playback resources
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.review.take().is_some() {
            info!("Studio shut down, playback released");
        }
    }

    fn notify(&self, notice: Notice) {
        debug!("Notice: {:?}", notice);
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }
}
