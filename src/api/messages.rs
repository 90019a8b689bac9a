use serde::{Deserialize, Serialize};

/// Body returned by `POST /process-file/`
///
/// Every top-level field is optional on the wire: a 2xx response can still
/// be partial, and the orchestrator decides whether it is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFileResponse {
    #[serde(default)]
    pub transcript: Option<Vec<SegmentPayload>>,
    #[serde(default)]
    pub summary: Option<SummaryPayload>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    /// Set by the service instead of the payload when processing blew up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One transcript segment as sent by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPayload {
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub text: String,
    /// Display label, e.g. "01:05"
    #[serde(default)]
    pub timestamp: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub action_items: Vec<String>,
}
