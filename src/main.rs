// Draft client entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Create mpsc channels
// 4. Spawn the transport task
// 5. Spawn the engine event loop
// 6. Log engine updates until interrupted
// 7. Cleanup on exit

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use draftroom::app::{self, Command, EngineUpdate, Timing};
use draftroom::config;
use draftroom::session::Session;
use draftroom::socket;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing();
    info!("draftroom starting up");

    // 2. Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "draftroom.toml".to_string());
    let config =
        config::load(Path::new(&config_path)).context("failed to load configuration")?;
    info!("config loaded: draft server at {}", config.connection.url);

    // 3. Create mpsc channels
    let (socket_tx, socket_rx) = mpsc::channel(256);
    let (out_tx, out_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (update_tx, mut update_rx) = mpsc::channel(256);

    // 4. Spawn the transport task
    let url = config.connection.url.clone();
    let socket_handle = tokio::spawn(async move {
        if let Err(e) = socket::run(&url, socket_tx, out_rx).await {
            error!("transport error: {e:#}");
        }
    });

    // 5. Spawn the engine event loop
    let timing = Timing {
        sync_interval: config.clock.sync_interval(),
        countdown_refresh: config.clock.countdown_refresh(),
    };
    let mut engine_handle = tokio::spawn(app::run(
        socket_rx,
        out_tx,
        cmd_rx,
        update_tx,
        Session::new(),
        timing,
    ));

    // 6. Log engine updates; a front end would render these instead.
    let update_handle = tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            match update {
                EngineUpdate::State(state) => info!("session state: {state:?}"),
                EngineUpdate::Connectivity => debug!("team connectivity changed"),
                EngineUpdate::AuctionStarted(auction) => info!(
                    "auction: {} at {} (deadline {})",
                    auction.player.full_name(),
                    auction.bid,
                    auction.end_time
                ),
                EngineUpdate::Countdown { seconds_left } => {
                    debug!("auction countdown: {seconds_left}s")
                }
                EngineUpdate::AuctionSettled { winning_team, player } => {
                    info!("auction settled: player {player} to team {winning_team}")
                }
                EngineUpdate::Rejected(rejection) => {
                    info!("nomination rejected: {}", rejection.reason)
                }
                EngineUpdate::ChannelClosed => info!("draft channel closed"),
            }
        }
    });

    // 7. Run until interrupted or the engine stops on its own.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            let _ = cmd_tx.send(Command::Quit).await;
            let _ = tokio::time::timeout(Duration::from_secs(5), &mut engine_handle).await;
        }
        result = &mut engine_handle => {
            if let Ok(Err(e)) = result {
                error!("engine error: {e:#}");
            }
        }
    }

    socket_handle.abort();
    update_handle.abort();
    info!("draftroom shut down cleanly");
    Ok(())
}

/// Initialize tracing to stderr with an env-filter override.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftroom=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
