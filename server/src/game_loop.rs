use crate::config::ServerConfig;
use crate::error::GameError;
use crate::protocol::{
    ChatContent, ChatMsg, GoalMsg, ServerMsg, SnapshotMsg, WelcomeMsg, PROTOCOL_VERSION,
};
use crate::state::GameState;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
#[derive(Debug)]
pub enum GameCommand {
    PlayerJoin {
        nickname: String,
        color: String,
        response: oneshot::Sender<Result<(u32, WelcomeMsg), GameError>>,
    },
    PlayerLeave {
        id: u32,
    },
    Move {
        id: u32,
        direction: f64,
        speed: f64,
    },
    Kick {
        id: u32,
    },
    Chat {
        id: u32,
        text: String,
    },
}

/// Broadcasts from game loop to all clients
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    Update(SnapshotMsg),
    Goal(GoalMsg),
    Chat(ChatMsg),
}

impl From<GameBroadcast> for ServerMsg {
    fn from(broadcast: GameBroadcast) -> Self {
        match broadcast {
            GameBroadcast::Update(snapshot) => ServerMsg::Update(snapshot),
            GameBroadcast::Goal(goal) => ServerMsg::Goal(goal),
            GameBroadcast::Chat(chat) => ServerMsg::Chat(chat),
        }
    }
}

/// Run the main game loop. Owns all game state; ticks and commands are
/// processed strictly one at a time.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut state = GameState::new(&server_config);

    let broadcast_every_n = u64::from(server_config.tick_rate_hz / server_config.broadcast_rate_hz);
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(server_config.tick_duration());
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                tick_count += 1;
                on_tick(&mut state, Instant::now(), tick_count, broadcast_every_n, &broadcast_tx);
            }

            Some(cmd) = cmd_rx.recv() => {
                handle_command(&mut state, cmd, &broadcast_tx);
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}

/// Advance the simulation once. The goal notice goes out on the tick the goal
/// is confirmed; snapshots go out every `every_n` ticks.
fn on_tick(
    state: &mut GameState,
    now: Instant,
    tick_count: u64,
    every_n: u64,
    broadcast_tx: &broadcast::Sender<GameBroadcast>,
) {
    let outcome = state.tick(now);

    if let Some(goal) = outcome.goal {
        tracing::info!(
            "Goal for {:?} by {:?}, score {}-{}",
            goal.team,
            goal.last_toucher.as_ref().map(|t| t.nickname.as_str()),
            state.score().home,
            state.score().away,
        );
        let _ = broadcast_tx.send(GameBroadcast::Goal(GoalMsg {
            team: goal.team,
            author: goal.last_toucher,
        }));
    }
    if let Some(team) = outcome.reset {
        tracing::debug!("Kickoff after {:?} goal", team);
    }

    if tick_count % every_n == 0 {
        let _ = broadcast_tx.send(GameBroadcast::Update(state.snapshot()));
    }
}

fn handle_command(
    state: &mut GameState,
    cmd: GameCommand,
    broadcast_tx: &broadcast::Sender<GameBroadcast>,
) {
    match cmd {
        GameCommand::PlayerJoin {
            nickname,
            color,
            response,
        } => match state.join(&nickname, &color) {
            Ok(id) => {
                let welcome = WelcomeMsg {
                    protocol_version: PROTOCOL_VERSION,
                    server_version: env!("CARGO_PKG_VERSION").to_string(),
                    self_id: id,
                    field: state.field,
                    snapshot: state.snapshot(),
                };
                if response.send(Ok((id, welcome))).is_err() {
                    // Connection went away while we were joining it
                    state.leave(id);
                    return;
                }
                if let Some(player) = state.players.get(&id) {
                    tracing::info!("Player {} joined as {:?}", id, player.team());
                    let _ = broadcast_tx.send(GameBroadcast::Chat(ChatMsg {
                        entity: player.tag(),
                        content: ChatContent::Connection { connected: true },
                    }));
                }
                let _ = broadcast_tx.send(GameBroadcast::Update(state.snapshot()));
            }
            Err(e) => {
                tracing::warn!("Rejected join: {}", e);
                let _ = response.send(Err(e));
            }
        },
        GameCommand::PlayerLeave { id } => {
            if let Some(player) = state.leave(id) {
                let _ = broadcast_tx.send(GameBroadcast::Update(state.snapshot()));
                let _ = broadcast_tx.send(GameBroadcast::Chat(ChatMsg {
                    entity: player.tag(),
                    content: ChatContent::Connection { connected: false },
                }));
                tracing::info!("Player {} left", id);
            } else {
                tracing::debug!("Leave for unknown player {}", id);
            }
        }
        GameCommand::Move {
            id,
            direction,
            speed,
        } => {
            if state.move_player(id, direction, speed) {
                let _ = broadcast_tx.send(GameBroadcast::Update(state.snapshot()));
            }
        }
        GameCommand::Kick { id } => {
            if state.kick(id) {
                let _ = broadcast_tx.send(GameBroadcast::Update(state.snapshot()));
            }
        }
        GameCommand::Chat { id, text } => {
            if let Some(msg) = state.chat(id, &text) {
                let _ = broadcast_tx.send(GameBroadcast::Chat(msg));
            }
        }
    }
}
