use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::audio::PositionStream;
use crate::session::{Generation, TranscriptSegment};

/// Latest playback position of a Ready session and the segment it falls in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub generation: Generation,
    pub position_seconds: f64,
    pub active_segment: Option<usize>,
}

/// Binds playback position and transcript segments in both directions
#[derive(Debug, Clone)]
pub struct TranscriptSynchronizer {
    segments: Vec<TranscriptSegment>,
}

impl TranscriptSynchronizer {
    /// `segments` must be ordered by start and non-overlapping
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment with `start <= seconds < end`, if any
    pub fn active_segment(&self, seconds: f64) -> Option<usize> {
        let after = self
            .segments
            .partition_point(|segment| segment.start_seconds <= seconds);
        let candidate = after.checked_sub(1)?;

        self.segments[candidate]
            .contains(seconds)
            .then_some(candidate)
    }

    /// Where a click on segment `index` seeks to
    pub fn seek_target(&self, index: usize) -> Option<f64> {
        self.segments.get(index).map(|segment| segment.start_seconds)
    }

    /// Follow `positions` and publish a snapshot for every sample
    ///
    /// Samples tagged with another generation are dropped. The task ends when
    /// the stream ends (clock released) or is aborted.
    pub fn spawn_tracker(
        &self,
        generation: Generation,
        mut positions: PositionStream,
        snapshots: watch::Sender<PlaybackSnapshot>,
    ) -> JoinHandle<()> {
        let synchronizer = self.clone();

        tokio::spawn(async move {
            info!("Segment tracker started for session {}", generation);

            while let Some(sample) = positions.next().await {
                if sample.generation != generation {
                    debug!(
                        "Dropping position sample from session {} in tracker {}",
                        sample.generation, generation
                    );
                    continue;
                }

                let active_segment = synchronizer.active_segment(sample.seconds);
                snapshots.send_replace(PlaybackSnapshot {
                    generation,
                    position_seconds: sample.seconds,
                    active_segment,
                });
            }

            info!("Segment tracker stopped for session {}", generation);
        })
    }
}
