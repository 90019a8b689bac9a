use serde::{Deserialize, Serialize};

/// User-visible notification
///
/// The four processing notices map one-to-one to session transitions:
/// reject while idle, enter Loading, Loading -> Ready, Loading -> Error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NoFileSelected,
    /// Only the first file of a multi-file selection is uploaded
    ExtraFilesIgnored { count: usize },
    ProcessingStarted,
    ProcessingComplete,
    ProcessingFailed { message: String },
    /// Audio is broken but transcript and summary are still valid
    PlaybackWarning { message: String },
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::NoFileSelected => "No file selected.".to_string(),
            Notice::ExtraFilesIgnored { count } => {
                format!("Only the first file is processed; {} ignored.", count)
            }
            Notice::ProcessingStarted => {
                "Processing your recording... This may take a moment.".to_string()
            }
            Notice::ProcessingComplete => "Processing complete!".to_string(),
            Notice::ProcessingFailed { message } | Notice::PlaybackWarning { message } => {
                message.clone()
            }
        }
    }
}
