// Shared test doubles: a scripted processing service and a fake media player
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use transcription_studio::api::{ProcessFileResponse, SegmentPayload, SummaryPayload};
use transcription_studio::{
    MediaPlayer, MediaSource, PlaybackError, PlayerFactory, ProcessingClient, SessionError,
    UploadFile,
};

pub const BASE_URL: &str = "http://localhost:8000";

type Reply = Result<ProcessFileResponse, SessionError>;

/// Processing service whose replies are released by the test, keyed by file name
pub struct ScriptedClient {
    pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    immediate: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(HashMap::new()),
            immediate: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Answer uploads of `file_name` right away
    pub fn reply(&self, file_name: &str, reply: Reply) {
        self.immediate
            .lock()
            .unwrap()
            .insert(file_name.to_string(), reply);
    }

    /// Hold uploads of `file_name` until the returned sender fires
    pub fn defer(&self, file_name: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .insert(file_name.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessingClient for ScriptedClient {
    async fn process_file(&self, file: UploadFile) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let immediate = self.immediate.lock().unwrap().remove(&file.name);
        if let Some(reply) = immediate {
            return reply;
        }

        let deferred = self.pending.lock().unwrap().remove(&file.name);
        match deferred {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SessionError::Transport("reply dropped".to_string()))),
            None => Err(SessionError::Transport(format!(
                "no scripted reply for {}",
                file.name
            ))),
        }
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }
}

/// Build a valid response with one segment per `(start, end)` pair
pub fn response(audio_url: &str, bounds: &[(f64, f64)]) -> ProcessFileResponse {
    let transcript = bounds
        .iter()
        .enumerate()
        .map(|(i, &(start, end))| SegmentPayload {
            speaker: format!("Speaker {}", i % 2 + 1),
            text: format!("Segment {}", i),
            timestamp: format!("{:02}:{:02}", (start as u64) / 60, (start as u64) % 60),
            start,
            end,
        })
        .collect();

    ProcessFileResponse {
        transcript: Some(transcript),
        summary: Some(SummaryPayload {
            overview: "Weekly sync".to_string(),
            key_points: vec!["Release moved".to_string()],
            participants: vec!["Speaker".to_string()],
            duration: "1:00".to_string(),
            action_items: vec![],
        }),
        audio_url: Some(audio_url.to_string()),
        duration: Some("1:00".to_string()),
        error: None,
    }
}

/// Observable state of one fake player
pub struct FakePlayerHandle {
    pub source: MediaSource,
    position: Mutex<f64>,
    playing: AtomicBool,
    detached: AtomicBool,
    seeks: Mutex<Vec<f64>>,
    sender: Mutex<Option<mpsc::UnboundedSender<f64>>>,
    pub reject_play: bool,
}

impl FakePlayerHandle {
    /// Fire a time-progress notification; false once detached
    pub fn emit(&self, seconds: f64) -> bool {
        *self.position.lock().unwrap() = seconds;
        match self.sender.lock().unwrap().as_ref() {
            Some(tx) => tx.send(seconds).is_ok(),
            None => false,
        }
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.seeks.lock().unwrap().clone()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

struct FakePlayer {
    handle: Arc<FakePlayerHandle>,
}

impl MediaPlayer for FakePlayer {
    fn attach(&mut self) -> Result<mpsc::UnboundedReceiver<f64>, PlaybackError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.handle.sender.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn detach(&mut self) {
        self.handle.sender.lock().unwrap().take();
        self.handle.detached.store(true, Ordering::SeqCst);
    }

    fn set_position(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        self.handle.seeks.lock().unwrap().push(seconds);
        *self.handle.position.lock().unwrap() = seconds;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.handle.reject_play {
            return Err(PlaybackError::Rejected("decoder not available".to_string()));
        }
        self.handle.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.handle.playing.store(false, Ordering::SeqCst);
    }

    fn position(&self) -> f64 {
        *self.handle.position.lock().unwrap()
    }

    fn is_playing(&self) -> bool {
        self.handle.playing.load(Ordering::SeqCst)
    }

    fn duration(&self) -> Option<f64> {
        self.handle.source.duration
    }
}

/// Hands out fake players and keeps their handles for inspection
#[derive(Default)]
pub struct FakePlayerFactory {
    players: Mutex<Vec<Arc<FakePlayerHandle>>>,
    pub fail_open: bool,
    pub reject_play: bool,
}

impl FakePlayerFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_open: true,
            ..Default::default()
        })
    }

    pub fn rejecting_play() -> Arc<Self> {
        Arc::new(Self {
            reject_play: true,
            ..Default::default()
        })
    }

    pub fn player(&self, index: usize) -> Arc<FakePlayerHandle> {
        Arc::clone(&self.players.lock().unwrap()[index])
    }

    pub fn opened(&self) -> usize {
        self.players.lock().unwrap().len()
    }

    /// A standalone player, for tests that drive a clock directly
    pub fn open_handle(&self, duration: Option<f64>) -> (Box<dyn MediaPlayer>, Arc<FakePlayerHandle>) {
        self.create(MediaSource {
            url: format!("{}/media/direct.wav", BASE_URL),
            duration,
        })
    }

    fn create(&self, source: MediaSource) -> (Box<dyn MediaPlayer>, Arc<FakePlayerHandle>) {
        let handle = Arc::new(FakePlayerHandle {
            source,
            position: Mutex::new(0.0),
            playing: AtomicBool::new(false),
            detached: AtomicBool::new(false),
            seeks: Mutex::new(Vec::new()),
            sender: Mutex::new(None),
            reject_play: self.reject_play,
        });
        self.players.lock().unwrap().push(Arc::clone(&handle));
        (
            Box::new(FakePlayer {
                handle: Arc::clone(&handle),
            }),
            handle,
        )
    }
}

impl PlayerFactory for FakePlayerFactory {
    fn open(&self, source: &MediaSource) -> Result<Box<dyn MediaPlayer>, PlaybackError> {
        if self.fail_open {
            return Err(PlaybackError::Unsupported("test media".to_string()));
        }

        let (player, _) = self.create(source.clone());
        Ok(player)
    }
}

pub fn file(name: &str) -> UploadFile {
    UploadFile::new(name, vec![0u8; 16])
}
