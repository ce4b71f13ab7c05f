//! Player controller demo - runs a headless session driven by a seeded bot
//!
//! Frames are logged as JSON at debug level; the session ends after
//! `MAX_TICKS` ticks or on Ctrl+C.

use rand::Rng;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use player_controller::bot::DemoBot;
use player_controller::config::Config;
use player_controller::game::{Session, SessionHandle};
use player_controller::util::time::tick_duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    let tuning = config.load_tuning()?;
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());

    info!("Starting player controller session");
    info!(seed, tick_rate = config.tick_rate, max_ticks = config.max_ticks, "Session settings");

    let (session, handle) = Session::new(&config, &tuning, seed);

    tokio::spawn(log_frames(handle.clone()));
    let bot = tokio::spawn(drive_bot(handle, seed, config.tick_rate));

    let stats = tokio::select! {
        stats = session.run() => stats,
        _ = shutdown_signal() => {
            bot.abort();
            info!("Session interrupted");
            return Ok(());
        }
    };
    bot.abort();

    info!(
        ticks = stats.ticks,
        duration_ms = stats.duration_ms,
        shots = stats.shots_fired,
        reloads = stats.reloads,
        jumps = stats.jumps,
        pickups = stats.pickups,
        drops = stats.drops,
        slow_ticks = stats.slow_ticks,
        "Session complete"
    );
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Feed bot input to the session once per tick
async fn drive_bot(handle: SessionHandle, seed: u64, tick_rate: u32) {
    let mut bot = DemoBot::new(seed);
    let mut ticker = tokio::time::interval(tick_duration(tick_rate));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        for event in bot.next_events() {
            if handle.input_tx.send(event).await.is_err() {
                return;
            }
        }
    }
}

async fn log_frames(handle: SessionHandle) {
    let mut frames = handle.subscribe();
    drop(handle);

    loop {
        match frames.recv().await {
            Ok(frame) => match serde_json::to_string(&frame) {
                Ok(json) => debug!(frame = %json, "Frame"),
                Err(e) => warn!(error = %e, "Failed to encode frame"),
            },
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Frame log lagging"),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
