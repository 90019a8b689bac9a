mod orchestrator;

pub use orchestrator::{
    resolve_media_url, validate_response, FileSelection, UploadFile, UploadOrchestrator,
};
