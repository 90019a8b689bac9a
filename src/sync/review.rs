use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::synchronizer::{PlaybackSnapshot, TranscriptSynchronizer};
use crate::audio::{MediaSource, PlaybackClock, PlayerFactory};
use crate::error::PlaybackError;
use crate::session::{Generation, ReadySession};

/// Resources that live exactly as long as one Ready session
///
/// Dropping it aborts the segment tracker and releases the playback clock.
pub struct ReviewSession {
    generation: Generation,
    synchronizer: TranscriptSynchronizer,
    clock: Option<PlaybackClock>,
    tracker: Option<JoinHandle<()>>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    /// Why there is no clock, if mounting it failed
    playback_fault: Option<PlaybackError>,
}

impl ReviewSession {
    /// Mount a clock for `ready` and start tracking the active segment
    ///
    /// A player that cannot be opened leaves the session without audio;
    /// transcript and summary stay usable.
    pub fn mount(generation: Generation, ready: &ReadySession, players: &dyn PlayerFactory) -> Self {
        let synchronizer = TranscriptSynchronizer::new(ready.segments.clone());
        let (tx, snapshots) = watch::channel(PlaybackSnapshot {
            generation,
            position_seconds: 0.0,
            active_segment: synchronizer.active_segment(0.0),
        });

        let source = MediaSource {
            url: ready.media_url.clone(),
            duration: ready.media_duration,
        };

        let mounted = players
            .open(&source)
            .and_then(|player| PlaybackClock::mount(generation, player));

        let (clock, tracker, playback_fault) = match mounted {
            Ok(mut clock) => {
                let tracker = clock
                    .observe_position()
                    .map(|positions| synchronizer.spawn_tracker(generation, positions, tx));
                (Some(clock), tracker, None)
            }
            Err(e) => {
                warn!("Session {}: audio unavailable: {}", generation, e);
                (None, None, Some(e))
            }
        };

        info!(
            "Review session {} mounted ({} segments, audio: {})",
            generation,
            synchronizer.segments().len(),
            if clock.is_some() { "yes" } else { "no" }
        );

        Self {
            generation,
            synchronizer,
            clock,
            tracker,
            snapshots,
            playback_fault,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn synchronizer(&self) -> &TranscriptSynchronizer {
        &self.synchronizer
    }

    pub fn playback_fault(&self) -> Option<&PlaybackError> {
        self.playback_fault.as_ref()
    }

    /// Seek to segment `index` and play
    ///
    /// `Ok(None)` when there is no such segment.
    pub fn click_segment(&mut self, index: usize) -> Result<Option<f64>, PlaybackError> {
        let Some(target) = self.synchronizer.seek_target(index) else {
            warn!("Session {}: no segment {}", self.generation, index);
            return Ok(None);
        };

        let clock = self.clock.as_mut().ok_or_else(|| {
            self.playback_fault
                .clone()
                .unwrap_or(PlaybackError::Detached)
        })?;

        let position = clock.seek_and_play(target)?;
        info!(
            "Session {}: segment {} -> seek to {:.2}s",
            self.generation, index, position
        );
        Ok(Some(position))
    }

    /// Latest published position and active segment
    pub fn playback(&self) -> PlaybackSnapshot {
        *self.snapshots.borrow()
    }

    pub fn watch_playback(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for ReviewSession {
    fn drop(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.abort();
        }
        // Release the clock before the tracker's channel goes away
        self.clock.take();
        info!("Review session {} released", self.generation);
    }
}
