use super::state::AppState;
use crate::error::SessionError;
use crate::studio::SubmitOutcome;
use crate::upload::{FileSelection, UploadFile};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, info, warn};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PlaySegmentResponse {
    pub index: usize,
    pub position_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn session_error_status(e: &SessionError) -> StatusCode {
    match e {
        SessionError::NoFileSelected => StatusCode::BAD_REQUEST,
        SessionError::Transport(_) | SessionError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        SessionError::PlaybackFault(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /session
/// Current session state
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.studio.snapshot().await))
}

/// POST /session/upload
/// Upload a recording; every multipart field named `file` joins the selection
pub async fn upload_recording(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload: {}", e);
                return error_response(StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("recording").to_string();
        match field.bytes().await {
            Ok(bytes) => files.push(UploadFile::new(name, bytes.to_vec())),
            Err(e) => {
                warn!("Failed to read upload {}: {}", name, e);
                return error_response(StatusCode::BAD_REQUEST, format!("Failed to read upload: {}", e));
            }
        }
    }

    info!("Upload request with {} file(s)", files.len());

    match state.studio.submit(FileSelection::new(files)).await {
        Ok(SubmitOutcome::Ready(snapshot)) => (StatusCode::OK, Json(snapshot)).into_response(),
        Ok(SubmitOutcome::Superseded) => error_response(
            StatusCode::CONFLICT,
            "Upload was superseded by a newer one",
        ),
        Err(e) => {
            error!("Upload failed: {}", e);
            error_response(session_error_status(&e), e.user_message())
        }
    }
}

/// POST /session/segments/:index/play
/// Seek to a transcript segment and start playback
pub async fn play_segment(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    match state.studio.click_segment(index).await {
        Ok(Some(position_seconds)) => (
            StatusCode::OK,
            Json(PlaySegmentResponse {
                index,
                position_seconds,
            }),
        )
            .into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("No segment {} in a ready session", index),
        ),
        Err(e) => error_response(session_error_status(&e), e.user_message()),
    }
}

/// GET /session/playback
/// Current playback position and active segment
pub async fn get_playback(State(state): State<AppState>) -> impl IntoResponse {
    match state.studio.playback().await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No ready session"),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
