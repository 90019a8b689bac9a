pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod studio;
pub mod sync;
pub mod upload;

pub use api::{HttpProcessingClient, ProcessFileResponse, ProcessingClient};
pub use audio::{
    MediaPlayer, MediaSource, PlaybackClock, PlayerFactory, PositionSample, PositionStream,
    SimulatedPlayer, SimulatedPlayerFactory,
};
pub use config::Config;
pub use error::{PlaybackError, SessionError};
pub use http::{create_router, AppState};
pub use session::{
    Generation, Notice, ReadySession, SessionMachine, SessionPhase, SessionState, Summary,
    TranscriptSegment, TranscriptView,
};
pub use studio::{SessionSnapshot, Studio, SubmitOutcome};
pub use sync::{PlaybackSnapshot, ReviewSession, TranscriptSynchronizer};
pub use upload::{FileSelection, UploadFile, UploadOrchestrator};
