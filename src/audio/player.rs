use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::PlaybackError;

/// Media handed to a player when a session becomes Ready
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub url: String,
    /// Known length in seconds, if the service reported one
    pub duration: Option<f64>,
}

/// Underlying media-playback primitive
///
/// Implementations:
/// - `SimulatedPlayer`: headless player that advances in real time
/// - Test doubles that record seeks and emit samples on demand
pub trait MediaPlayer: Send {
    /// Start time-progress notifications
    ///
    /// Returns a channel receiver that gets the current position (seconds)
    /// on every notification. Only one receiver is live at a time.
    fn attach(&mut self) -> Result<mpsc::UnboundedReceiver<f64>, PlaybackError>;

    /// Stop notifications and drop the sender side
    fn detach(&mut self);

    fn set_position(&mut self, seconds: f64) -> Result<(), PlaybackError>;

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn position(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Length of the media in seconds, if known
    fn duration(&self) -> Option<f64>;
}

/// Creates one player per Ready session
pub trait PlayerFactory: Send + Sync {
    fn open(&self, source: &MediaSource) -> Result<Box<dyn MediaPlayer>, PlaybackError>;
}

const PLAYABLE_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "mp4", "ogg", "webm", "flac", "aac"];

/// Factory for `SimulatedPlayer`
pub struct SimulatedPlayerFactory {
    tick: Duration,
}

impl SimulatedPlayerFactory {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }
}

impl PlayerFactory for SimulatedPlayerFactory {
    fn open(&self, source: &MediaSource) -> Result<Box<dyn MediaPlayer>, PlaybackError> {
        let path = reqwest::Url::parse(&source.url)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| source.url.clone());

        let file_name = path.rsplit('/').next().unwrap_or_default();
        if let Some((_, ext)) = file_name.rsplit_once('.') {
            if !PLAYABLE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
            {
                return Err(PlaybackError::Unsupported(format!(
                    "cannot play .{} media",
                    ext
                )));
            }
        }

        info!("Opening simulated player for {}", source.url);
        Ok(Box::new(SimulatedPlayer::new(source.clone(), self.tick)))
    }
}

/// Headless player whose position advances in real time while playing
///
/// A ticker task emits the position every `tick` while playing, and a sample
/// is also emitted on every seek. Playback stops at the end of the media.
pub struct SimulatedPlayer {
    source: MediaSource,
    tick: Duration,
    /// Position in seconds, stored as `f64` bits
    position_bits: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    notifier: Option<mpsc::UnboundedSender<f64>>,
    ticker: Option<JoinHandle<()>>,
}

impl SimulatedPlayer {
    pub fn new(source: MediaSource, tick: Duration) -> Self {
        Self {
            source,
            tick,
            position_bits: Arc::new(AtomicU64::new(0f64.to_bits())),
            playing: Arc::new(AtomicBool::new(false)),
            notifier: None,
            ticker: None,
        }
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn attach(&mut self) -> Result<mpsc::UnboundedReceiver<f64>, PlaybackError> {
        self.detach();

        let (tx, rx) = mpsc::unbounded_channel();
        let position_bits = Arc::clone(&self.position_bits);
        let playing = Arc::clone(&self.playing);
        let duration = self.source.duration;
        let tick = self.tick;
        let ticker_tx = tx.clone();

        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await; // first tick completes immediately

            loop {
                interval.tick().await;
                if !playing.load(Ordering::SeqCst) {
                    continue;
                }

                let mut position =
                    f64::from_bits(position_bits.load(Ordering::SeqCst)) + tick.as_secs_f64();
                if let Some(end) = duration {
                    if position >= end {
                        position = end;
                        playing.store(false, Ordering::SeqCst);
                    }
                }
                position_bits.store(position.to_bits(), Ordering::SeqCst);

                if ticker_tx.send(position).is_err() {
                    break;
                }
            }
            debug!("Simulated player ticker stopped");
        });

        self.notifier = Some(tx);
        self.ticker = Some(ticker);
        Ok(rx)
    }

    fn detach(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.notifier = None;
    }

    fn set_position(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        self.position_bits.store(seconds.to_bits(), Ordering::SeqCst);
        if let Some(tx) = &self.notifier {
            // Receiver gone means nobody listens anymore, not a seek failure
            let _ = tx.send(seconds);
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if let Some(end) = self.source.duration {
            if self.position() >= end {
                return Ok(());
            }
        }
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn position(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::SeqCst))
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn duration(&self) -> Option<f64> {
        self.source.duration
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.detach();
    }
}
