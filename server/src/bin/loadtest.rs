//! Load test for the soccer server.
//!
//! Spawns multiple fake WebSocket clients that:
//! - Join with a generated nickname
//! - Wander around, periodically trying to kick
//! - Count update, goal and chat broadcasts
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use soccer_server::protocol::{ClientMsg, ServerMsg};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Parser, Debug)]
#[clap(about = "Drive many fake clients against a soccer server")]
struct Args {
    /// Number of clients to spawn
    #[clap(long, default_value = "20")]
    clients: u32,
    /// Test duration in seconds
    #[clap(long, default_value = "30")]
    duration: u64,
    /// Move commands per second per client
    #[clap(long, default_value = "20")]
    move_rate: f64,
    /// Server URL
    #[clap(long, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,
}

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    spectators: AtomicU64,
    messages_received: AtomicU64,
    updates_received: AtomicU64,
    goals_received: AtomicU64,
    moves_sent: AtomicU64,
    kicks_sent: AtomicU64,
    errors: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

fn encode(msg: &ClientMsg) -> Message {
    // ClientMsg has no maps or non-string keys, serialization cannot fail
    Message::Text(serde_json::to_string(msg).unwrap_or_default().into())
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    move_rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    let join = ClientMsg::Join {
        nickname: format!("bot{}", client_id),
        color: format!("#{:06x}", client_id.wrapping_mul(0x9e3779) & 0xffffff),
    };
    if ws.send(encode(&join)).await.is_err() {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        return;
    }

    // Wait for welcome before doing anything else
    let welcome = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                    match serde_json::from_str::<ServerMsg>(&text) {
                        Ok(ServerMsg::Welcome(welcome)) => return Some(welcome),
                        Ok(ServerMsg::Error(err)) => {
                            eprintln!("Client {} rejected: {}", client_id, err.reason);
                            return None;
                        }
                        _ => {}
                    }
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                _ => {}
            }
        }
        None
    })
    .await;

    let Ok(Some(welcome)) = welcome else {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        return;
    };

    let latency = connect_start.elapsed();
    metrics
        .latency_sum_ms
        .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    let on_field = welcome
        .snapshot
        .players
        .iter()
        .any(|p| p.id == welcome.self_id && p.team.is_some());
    if !on_field {
        metrics.spectators.fetch_add(1, Ordering::Relaxed);
    }

    let move_interval = if move_rate > 0.0 {
        Duration::from_secs_f64(1.0 / move_rate)
    } else {
        Duration::from_secs(3600) // Effectively never
    };
    let mut move_timer = tokio::time::interval(move_interval);
    move_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = Instant::now() + duration;
    let mut direction: f64 = rand::thread_rng().gen_range(0.0..std::f64::consts::TAU);

    while Instant::now() < test_end {
        tokio::select! {
            _ = move_timer.tick() => {
                let (turn, kick) = {
                    let mut rng = rand::thread_rng();
                    (rng.gen_range(-0.4..0.4), rng.gen_bool(0.1))
                };
                direction += turn;
                let msg = if kick {
                    ClientMsg::Kick
                } else {
                    ClientMsg::Move { direction, speed: 3.0 }
                };
                if ws.send(encode(&msg)).await.is_err() {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                let counter = if kick { &metrics.kicks_sent } else { &metrics.moves_sent };
                counter.fetch_add(1, Ordering::Relaxed);
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::Update(_)) => {
                                metrics.updates_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Goal(_)) => {
                                metrics.goals_received.fetch_add(1, Ordering::Relaxed);
                            }
                            _ => {}
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args = Args::parse();

    println!("=== Soccer Server Load Test ===");
    println!("Clients: {}", args.clients);
    println!("Duration: {}s", args.duration);
    println!("Move rate: {}/s per client", args.move_rate);
    println!("URL: {}", args.url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(args.duration);
    let move_rate = args.move_rate;

    let mut handles = Vec::with_capacity(args.clients as usize);
    for client_id in 0..args.clients {
        let url = args.url.clone();
        let metrics = Arc::clone(&metrics);
        handles.push(tokio::spawn(async move {
            run_client(client_id, url, move_rate, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    // Print stats periodically
    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();
        loop {
            interval.tick().await;
            println!(
                "[{:3}s] connected={}, msgs={}, updates={}, goals={}, \
                 moves={}, kicks={}, errors={}",
                start.elapsed().as_secs(),
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.updates_received.load(Ordering::Relaxed),
                metrics_clone.goals_received.load(Ordering::Relaxed),
                metrics_clone.moves_sent.load(Ordering::Relaxed),
                metrics_clone.kicks_sent.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }
    stats_handle.abort();

    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);
    let updates = metrics.updates_received.load(Ordering::Relaxed);

    println!();
    println!("=== Final Results ===");
    println!("Joined as spectator: {}", metrics.spectators.load(Ordering::Relaxed));
    println!("Total messages received: {}", metrics.messages_received.load(Ordering::Relaxed));
    println!("Total updates: {}", updates);
    println!("Total goals seen: {}", metrics.goals_received.load(Ordering::Relaxed));
    println!("Errors: {}", metrics.errors.load(Ordering::Relaxed));
    if latency_count > 0 {
        println!("Avg join latency: {}ms", latency_sum / latency_count);
        let per_client = updates as f64 / latency_count as f64 / args.duration.max(1) as f64;
        println!("Updates per client per second: {:.1}", per_client);
    }
}
