use anyhow::Result;
use castlink::{
    Config, FfprobeProbe, FileStore, RecordingLocator, ResolveError, SessionCoordinator,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "castlink", about = "Screencast session coordination host")]
struct Args {
    /// Path to the config file (without extension)
    #[arg(short, long, default_value = "config/castlink")]
    config: String,

    /// How long to observe the session before exiting, in seconds
    #[arg(long, default_value_t = 10)]
    watch_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);
    info!("Shared state directory: {}", cfg.store.path);

    let store: Arc<dyn castlink::SharedStateStore> = Arc::new(FileStore::open(&cfg.store.path)?);

    let coordinator = SessionCoordinator::new(
        Arc::clone(&store),
        Duration::from_millis(cfg.session.poll_interval_ms),
    );

    let code = coordinator.issue_pairing_code()?;
    info!("Pairing code for this session: {}", code);

    coordinator.run().await;

    // Watch the session for a while, the way a control surface would
    for _ in 0..args.watch_secs {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let snapshot = coordinator.observe_state();
        if snapshot.active {
            info!(
                "Broadcasting, elapsed {:.0}s (code {})",
                snapshot.elapsed.as_secs_f64(),
                snapshot.pairing_code
            );
        } else {
            info!("Idle (code {})", snapshot.pairing_code);
        }
    }

    coordinator.stop().await;

    let locator = RecordingLocator::new(Arc::clone(&store), Arc::new(FfprobeProbe))
        .with_min_bytes(cfg.recording.min_bytes);

    match locator.resolve_last_recording() {
        Ok(recording) => info!(
            "Last recording: {} ({} bytes)",
            recording.path.display(),
            recording.size_bytes
        ),
        Err(ResolveError::NotFound) => info!("No recording produced yet"),
        Err(e) => warn!("Could not resolve last recording: {}", e),
    }

    Ok(())
}
