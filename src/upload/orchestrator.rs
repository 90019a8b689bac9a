use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{ProcessFileResponse, ProcessingClient};
use crate::error::SessionError;
use crate::session::{normalize_segments, parse_duration_label, ReadySession, Summary};

/// A recording picked by the user
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string());

        Ok(Self { name, bytes })
    }
}

/// Zero or more files from a drop or picker
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    files: Vec<UploadFile>,
}

impl FileSelection {
    pub fn new(files: Vec<UploadFile>) -> Self {
        Self { files }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file to upload and how many extra files are ignored
    ///
    /// Only the first file of a multi-file selection is processed.
    pub fn into_first(self) -> Option<(UploadFile, usize)> {
        let ignored = self.files.len().saturating_sub(1);
        self.files.into_iter().next().map(|file| (file, ignored))
    }
}

impl From<UploadFile> for FileSelection {
    fn from(file: UploadFile) -> Self {
        Self { files: vec![file] }
    }
}

/// Sends one upload to the processing service and validates the answer
pub struct UploadOrchestrator {
    client: Arc<dyn ProcessingClient>,
}

impl UploadOrchestrator {
    pub fn new(client: Arc<dyn ProcessingClient>) -> Self {
        Self { client }
    }

    /// Issue exactly one request for `file` and turn the response into a
    /// displayable session
    pub async fn process(&self, file: UploadFile) -> Result<ReadySession, SessionError> {
        let upload_id = Uuid::new_v4();
        info!("Upload {}: sending {} ({} bytes)", upload_id, file.name, file.bytes.len());

        let response = match self.client.process_file(file).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Upload {} failed: {}", upload_id, e);
                return Err(e);
            }
        };

        match validate_response(response, self.client.base_url()) {
            Ok(ready) => {
                info!(
                    "Upload {}: {} segments, media at {}",
                    upload_id,
                    ready.segments.len(),
                    ready.media_url
                );
                Ok(ready)
            }
            Err(e) => {
                warn!("Upload {}: {}", upload_id, e);
                Err(e)
            }
        }
    }
}

/// Accept a 2xx body only if transcript, summary and media locator are all present
pub fn validate_response(
    response: ProcessFileResponse,
    base_url: &str,
) -> Result<ReadySession, SessionError> {
    let ProcessFileResponse {
        transcript,
        summary,
        audio_url,
        duration,
        error,
    } = response;

    if let Some(reported) = error {
        if transcript.is_none() {
            return Err(SessionError::InvalidResponse(format!(
                "service reported an error: {}",
                reported
            )));
        }
    }

    let transcript = transcript
        .ok_or_else(|| SessionError::InvalidResponse("missing transcript".to_string()))?;
    let summary =
        summary.ok_or_else(|| SessionError::InvalidResponse("missing summary".to_string()))?;
    let audio_url = audio_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| SessionError::InvalidResponse("missing audioUrl".to_string()))?;

    let segments = normalize_segments(transcript).map_err(SessionError::InvalidResponse)?;
    let summary = Summary::from_payload(summary, duration.as_deref());
    let media_url = resolve_media_url(base_url, &audio_url)?;
    let media_duration = parse_duration_label(&summary.duration_label);

    Ok(ReadySession {
        segments,
        summary,
        media_url,
        media_duration,
    })
}

/// Combine the service base location with a (usually relative) media locator
pub fn resolve_media_url(base_url: &str, locator: &str) -> Result<String, SessionError> {
    let locator = locator.trim();
    if let Ok(absolute) = reqwest::Url::parse(locator) {
        return Ok(absolute.to_string());
    }

    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        locator.trim_start_matches('/')
    );

    reqwest::Url::parse(&joined)
        .map(|url| url.to_string())
        .map_err(|e| SessionError::InvalidResponse(format!("bad media locator {}: {}", locator, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{SegmentPayload, SummaryPayload};

    fn full_response() -> ProcessFileResponse {
        ProcessFileResponse {
            transcript: Some(vec![SegmentPayload {
                speaker: "Speaker".to_string(),
                text: "Hello".to_string(),
                timestamp: "00:00".to_string(),
                start: 0.0,
                end: 4.0,
            }]),
            summary: Some(SummaryPayload::default()),
            audio_url: Some("/media/abc.wav".to_string()),
            duration: Some("2:05".to_string()),
            error: None,
        }
    }

    #[test]
    fn test_selection_takes_first_file() {
        let selection = FileSelection::new(vec![
            UploadFile::new("a.wav", vec![1]),
            UploadFile::new("b.wav", vec![2]),
            UploadFile::new("c.wav", vec![3]),
        ]);

        let (file, ignored) = selection.into_first().unwrap();
        assert_eq!(file.name, "a.wav");
        assert_eq!(ignored, 2);
        assert!(FileSelection::empty().into_first().is_none());
    }

    #[test]
    fn test_resolve_relative_locator() {
        let url = resolve_media_url("http://localhost:8000", "/media/abc.wav").unwrap();
        assert_eq!(url, "http://localhost:8000/media/abc.wav");

        // Base path prefixes survive
        let url = resolve_media_url("http://gw.local/api/", "media/abc.wav").unwrap();
        assert_eq!(url, "http://gw.local/api/media/abc.wav");
    }

    #[test]
    fn test_resolve_absolute_locator_unchanged() {
        let url = resolve_media_url("http://localhost:8000", "https://cdn.example.com/x.wav").unwrap();
        assert_eq!(url, "https://cdn.example.com/x.wav");
    }

    #[test]
    fn test_validate_full_response() {
        let ready = validate_response(full_response(), "http://localhost:8000").unwrap();

        assert_eq!(ready.segments.len(), 1);
        assert_eq!(ready.media_url, "http://localhost:8000/media/abc.wav");
        assert_eq!(ready.summary.duration_label, "2:05");
        assert_eq!(ready.media_duration, Some(125.0));
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut response = full_response();
        response.audio_url = None;
        assert!(matches!(
            validate_response(response, "http://h"),
            Err(SessionError::InvalidResponse(msg)) if msg.contains("audioUrl")
        ));

        let mut response = full_response();
        response.audio_url = Some(String::new());
        assert!(validate_response(response, "http://h").is_err());

        let mut response = full_response();
        response.summary = None;
        assert!(validate_response(response, "http://h").is_err());

        let mut response = full_response();
        response.transcript = None;
        assert!(validate_response(response, "http://h").is_err());
    }

    #[test]
    fn test_validate_service_error_body() {
        let response = ProcessFileResponse {
            error: Some("An error occurred: ffmpeg failed".to_string()),
            ..Default::default()
        };

        match validate_response(response, "http://h") {
            Err(SessionError::InvalidResponse(msg)) => assert!(msg.contains("ffmpeg failed")),
            other => panic!("expected invalid response, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_empty_transcript_is_ready() {
        let mut response = full_response();
        response.transcript = Some(Vec::new());

        let ready = validate_response(response, "http://h").unwrap();
        assert!(ready.segments.is_empty());
    }

    #[test]
    fn test_open_keeps_file_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standup.m4a");
        std::fs::write(&path, b"fake audio").unwrap();

        let file = UploadFile::open(&path).unwrap();
        assert_eq!(file.name, "standup.m4a");
        assert_eq!(file.bytes, b"fake audio".to_vec());

        assert!(UploadFile::open(dir.path().join("missing.wav")).is_err());
    }
}
