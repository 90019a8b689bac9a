pub mod client;
pub mod messages;

pub use client::{HttpProcessingClient, ProcessingClient};
pub use messages::{ProcessFileResponse, SegmentPayload, SummaryPayload};
