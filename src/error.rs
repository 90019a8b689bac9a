use thiserror::Error;

/// Failures of the underlying media-playback primitive
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Unsupported media: {0}")]
    Unsupported(String),

    #[error("Playback rejected: {0}")]
    Rejected(String),

    #[error("Player is detached")]
    Detached,
}

/// Errors surfaced by an upload-to-review session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Playback fault: {0}")]
    PlaybackFault(#[from] PlaybackError),
}

impl SessionError {
    /// Text shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            SessionError::NoFileSelected => "No file selected.".to_string(),
            SessionError::Transport(_) | SessionError::InvalidResponse(_) => {
                "An error occurred during processing. Please try again.".to_string()
            }
            SessionError::PlaybackFault(e) => format!("Audio playback is unavailable: {}", e),
        }
    }
}
