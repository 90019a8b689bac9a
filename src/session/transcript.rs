use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{SegmentPayload, SummaryPayload};

/// A single timestamped utterance block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub speaker: String,
    pub text: String,
    /// Display label, e.g. "01:05"
    pub timestamp_label: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TranscriptSegment {
    pub fn contains(&self, seconds: f64) -> bool {
        self.start_seconds <= seconds && seconds < self.end_seconds
    }
}

/// Meeting summary as produced by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub overview: String,
    pub key_points: Vec<String>,
    /// Unique names, in the order they first appeared
    pub participants: Vec<String>,
    pub duration_label: String,
    pub action_items: Vec<String>,
}

impl Summary {
    /// Build from the wire shape; `fallback_duration` is the response's
    /// top-level duration, used when the summary carries none
    pub fn from_payload(payload: SummaryPayload, fallback_duration: Option<&str>) -> Self {
        let mut participants: Vec<String> = Vec::with_capacity(payload.participants.len());
        for name in payload.participants {
            if !participants.contains(&name) {
                participants.push(name);
            }
        }

        let duration_label = if payload.duration.trim().is_empty() {
            fallback_duration.unwrap_or_default().to_string()
        } else {
            payload.duration
        };

        Self {
            overview: payload.overview,
            key_points: payload.key_points,
            participants,
            duration_label,
            action_items: payload.action_items,
        }
    }
}

/// Turn wire segments into an ordered, non-overlapping list
///
/// Non-finite or negative bounds and inverted ranges reject the whole
/// transcript. Out-of-order segments are sorted, overlaps are clipped and
/// zero-length segments dropped.
pub fn normalize_segments(payloads: Vec<SegmentPayload>) -> Result<Vec<TranscriptSegment>, String> {
    let mut segments = Vec::with_capacity(payloads.len());

    for (index, payload) in payloads.into_iter().enumerate() {
        if !payload.start.is_finite() || !payload.end.is_finite() {
            return Err(format!("segment {} has non-finite bounds", index));
        }
        if payload.start < 0.0 {
            return Err(format!("segment {} starts before zero", index));
        }
        if payload.end < payload.start {
            return Err(format!(
                "segment {} ends before it starts ({} < {})",
                index, payload.end, payload.start
            ));
        }

        segments.push(TranscriptSegment {
            speaker: payload.speaker,
            text: payload.text.trim().to_string(),
            timestamp_label: payload.timestamp,
            start_seconds: payload.start,
            end_seconds: payload.end,
        });
    }

    if segments
        .windows(2)
        .any(|pair| pair[1].start_seconds < pair[0].start_seconds)
    {
        warn!("Transcript segments arrived out of order, sorting by start time");
        segments.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
    }

    for i in 1..segments.len() {
        let next_start = segments[i].start_seconds;
        let prev = &mut segments[i - 1];
        if prev.end_seconds > next_start {
            warn!(
                "Segment at {:.2}s overlaps the next one, clipping end {:.2}s -> {:.2}s",
                prev.start_seconds, prev.end_seconds, next_start
            );
            prev.end_seconds = next_start;
        }
    }

    let before = segments.len();
    segments.retain(|s| s.start_seconds < s.end_seconds);
    if segments.len() < before {
        warn!("Dropped {} zero-length segments", before - segments.len());
    }

    Ok(segments)
}

/// Parse a duration label ("m:ss" or "h:mm:ss") into seconds
///
/// Returns `None` for placeholders such as "N/A".
pub fn parse_duration_label(label: &str) -> Option<f64> {
    let parts: Vec<&str> = label.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let mut total: u64 = 0;
    for part in parts {
        let value: u64 = part.trim().parse().ok()?;
        total = total * 60 + value;
    }

    Some(total as f64)
}
