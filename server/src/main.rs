use anyhow::Context;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use soccer_server::config::ServerConfig;
use soccer_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use soccer_server::ws::{ws_handler, AppState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

/// Authoritative server for the multiplayer soccer game.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on
    #[clap(short, long, default_value = "3000")]
    port: u16,
    /// Simulation ticks per second
    #[clap(short, long, default_value = "60")]
    tick_rate: u32,
    /// Goals needed before the score resets
    #[clap(long, default_value = "5")]
    win_score: u32,
    /// Maximum simultaneous connections
    #[clap(long, default_value = "64")]
    max_connections: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig {
        listen_addr: format!("{}:{}", args.host, args.port),
        tick_rate_hz: args.tick_rate,
        broadcast_rate_hz: args.tick_rate,
        win_score: args.win_score,
        max_connections: args.max_connections,
        ..Default::default()
    };

    // Validate configuration before starting
    config.validate().context("invalid server configuration")?;

    let listen_addr = config.listen_addr.clone();
    let max_connections = config.max_connections;

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(64);

    // Spawn game loop
    let bc_tx = broadcast_tx.clone();
    tokio::spawn(async move {
        run_game_loop(game_rx, bc_tx, config).await;
    });

    // Axum app
    let app_state = AppState {
        game_tx,
        broadcast_tx,
        connection_semaphore: Arc::new(Semaphore::new(max_connections)),
    };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Starting soccer server on {}", listen_addr);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", listen_addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
