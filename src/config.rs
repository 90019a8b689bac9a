use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub processing: ProcessingConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Where the external transcription/summarization service lives
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Base location; relative media locators are resolved against it
    pub base_url: String,
    pub endpoint: String,
    pub request_timeout_secs: u64,
    /// File picker hint only, the service decides what it accepts
    pub accepted_extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// Interval between position notifications of the simulated player
    pub tick_ms: u64,
}

impl ProcessingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Full URL of the processing endpoint
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }

    pub fn accepts(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => self
                .accepted_extensions
                .iter()
                .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

impl PlaybackConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl Config {
    /// Load configuration from `path` (extension optional), falling back to
    /// built-in defaults for every key the file does not set
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(path).required(false))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("service.name", "transcription-studio")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8090)?
            .set_default("processing.base_url", "http://localhost:8000")?
            .set_default("processing.endpoint", "/process-file/")?
            .set_default("processing.request_timeout_secs", 600)?
            .set_default(
                "processing.accepted_extensions",
                vec!["zip", "mp3", "mp4", "m4a", "wav"],
            )?
            .set_default("playback.tick_ms", 250)?)
    }
}
