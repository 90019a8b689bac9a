//! HTTP API for an external presentation layer
//!
//! This module exposes the studio over a small REST API:
//! - GET /session - Current session snapshot
//! - POST /session/upload - Upload a recording (multipart, field `file`)
//! - POST /session/segments/:index/play - Seek to a segment and play
//! - GET /session/playback - Current position and active segment
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
