use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::player::MediaPlayer;
use crate::error::PlaybackError;
use crate::session::Generation;

/// One time-progress notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Session the sample belongs to
    pub generation: Generation,
    pub seconds: f64,
}

/// Lazy, infinite stream of position samples from one clock
///
/// Ends only when the clock is released.
pub struct PositionStream {
    generation: Generation,
    rx: mpsc::UnboundedReceiver<f64>,
}

impl Stream for PositionStream {
    type Item = PositionSample;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let generation = self.generation;
        self.rx.poll_recv(cx).map(|sample| {
            sample.map(|seconds| PositionSample {
                generation,
                seconds,
            })
        })
    }
}

/// Playback wrapper owned by exactly one Ready session
///
/// Mounting attaches to the player's notifications; dropping the clock
/// pauses the player and detaches it, so no sample outlives the session.
pub struct PlaybackClock {
    generation: Generation,
    player: Box<dyn MediaPlayer>,
    samples: Option<mpsc::UnboundedReceiver<f64>>,
}

impl PlaybackClock {
    pub fn mount(generation: Generation, mut player: Box<dyn MediaPlayer>) -> Result<Self, PlaybackError> {
        let samples = player.attach()?;
        info!("Playback clock mounted for session {}", generation);

        Ok(Self {
            generation,
            player,
            samples: Some(samples),
        })
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Hand out the position stream; a clock has exactly one observer
    pub fn observe_position(&mut self) -> Option<PositionStream> {
        let rx = self.samples.take()?;
        Some(PositionStream {
            generation: self.generation,
            rx,
        })
    }

    /// Move to `target` (clamped into the media) and start playing
    ///
    /// Returns the position actually applied.
    pub fn seek_and_play(&mut self, target: f64) -> Result<f64, PlaybackError> {
        let position = clamp_position(target, self.player.duration());
        if position != target {
            debug!("Seek target {:.2}s clamped to {:.2}s", target, position);
        }

        self.player.set_position(position)?;
        self.player.play()?;
        Ok(position)
    }

    pub fn position(&self) -> f64 {
        self.player.position()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn duration(&self) -> Option<f64> {
        self.player.duration()
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.player.pause();
        self.player.detach();
        info!("Playback clock released for session {}", self.generation);
    }
}

/// Clamp into `[0, duration]`; non-finite targets go to the start
pub fn clamp_position(target: f64, duration: Option<f64>) -> f64 {
    if !target.is_finite() {
        warn!("Non-finite seek target {}, seeking to start", target);
        return 0.0;
    }

    let lower = target.max(0.0);
    match duration {
        Some(end) if end.is_finite() && end >= 0.0 => lower.min(end),
        _ => lower,
    }
}
