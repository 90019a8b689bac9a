use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use transcription_studio::{
    create_router, AppState, Config, FileSelection, HttpProcessingClient, SessionState,
    SimulatedPlayerFactory, Studio, SubmitOutcome, UploadFile,
};

#[derive(Parser)]
#[command(name = "transcription-studio", about = "Upload a meeting recording and review its transcript")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/transcription-studio")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the review API for a presentation layer
    Serve,
    /// Process one recording and print its transcript and summary
    Process {
        /// Recording(s); only the first one is processed
        files: Vec<PathBuf>,

        /// Seek to this segment afterwards and follow playback for a few seconds
        #[arg(long)]
        play: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Transcription Studio v0.1.0");
    info!("Loaded config: {}", cfg.service.name);

    let client = Arc::new(HttpProcessingClient::new(&cfg.processing)?);
    let players = Arc::new(SimulatedPlayerFactory::new(cfg.playback.tick()));
    let studio = Arc::new(Studio::new(client, players));

    // Surface notices the way a UI would show toasts
    let mut notices = studio.subscribe_notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            info!("[notice] {}", notice.text());
        }
    });

    match cli.command {
        Command::Serve => serve(&cfg, studio).await,
        Command::Process { files, play } => process(&cfg, &studio, files, play).await,
    }
}

async fn serve(cfg: &Config, studio: Arc<Studio>) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    let app = create_router(AppState::new(Arc::clone(&studio)));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server failed")?;

    studio.shutdown().await;
    Ok(())
}

async fn process(
    cfg: &Config,
    studio: &Studio,
    paths: Vec<PathBuf>,
    play: Option<usize>,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = UploadFile::open(path)?;
        if !cfg.processing.accepts(&file.name) {
            warn!(
                "{} is not one of {:?}, sending anyway",
                file.name, cfg.processing.accepted_extensions
            );
        }
        files.push(file);
    }

    match studio.submit(FileSelection::new(files)).await {
        Ok(SubmitOutcome::Ready(_)) => {}
        Ok(SubmitOutcome::Superseded) => anyhow::bail!("Upload was superseded"),
        Err(e) => return Err(e).context("Processing failed"),
    }

    if let SessionState::Ready(ready) = studio.state().await {
        println!("Audio: {}", ready.media_url);
        println!("Duration: {}", ready.summary.duration_label);
        println!();
        for (index, segment) in ready.segments.iter().enumerate() {
            println!(
                "[{:>3}] {} {}: {}",
                index, segment.timestamp_label, segment.speaker, segment.text
            );
        }
        if ready.segments.is_empty() {
            println!("(no transcript segments)");
        }
        println!();
        println!("Overview: {}", ready.summary.overview);
        for point in &ready.summary.key_points {
            println!("  - {}", point);
        }
        if !ready.summary.action_items.is_empty() {
            println!("Action items:");
            for item in &ready.summary.action_items {
                println!("  - {}", item);
            }
        }
    }

    if let Some(index) = play {
        follow_playback(studio, index).await?;
    }

    studio.shutdown().await;
    Ok(())
}

async fn follow_playback(studio: &Studio, index: usize) -> Result<()> {
    let Some(position) = studio.click_segment(index).await? else {
        warn!("Segment {} does not exist", index);
        return Ok(());
    };
    info!("Playing from {:.2}s", position);

    let Some(mut playback) = studio.watch_playback().await else {
        return Ok(());
    };

    let deadline = tokio::time::sleep(Duration::from_secs(3));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = playback.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *playback.borrow_and_update();
                info!(
                    "position {:.2}s, active segment {:?}",
                    snapshot.position_seconds, snapshot.active_segment
                );
            }
        }
    }

    Ok(())
}
