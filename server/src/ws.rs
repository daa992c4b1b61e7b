use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, Semaphore};

use crate::error::GameError;
use crate::game_loop::{GameBroadcast, GameCommand};
use crate::protocol::{ClientMsg, ErrorMsg, PongMsg, ServerMsg};

/// Frames larger than this close the connection
pub const MAX_MESSAGE_BYTES: usize = 1024;
/// Unparseable messages tolerated before the connection is closed
pub const MAX_PARSE_ERRORS: u32 = 5;
/// How long a fresh connection may take to send its join message
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
    pub connection_semaphore: Arc<Semaphore>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_MESSAGE_BYTES)
        .on_upgrade(|socket| handle_socket(socket, app_state))
}

fn encode(msg: &ServerMsg) -> Option<Message> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!("Failed to encode server message: {}", e);
            None
        }
    }
}

/// Tell the client why it is being dropped, then close.
async fn reject(sink: &mut SplitSink<WebSocket, Message>, reason: &str) {
    let msg = ServerMsg::Error(ErrorMsg {
        reason: reason.to_string(),
    });
    if let Some(frame) = encode(&msg) {
        let _ = sink.send(frame).await;
    }
    let _ = sink.send(Message::Close(None)).await;
}

/// Wait for the first frame and require it to be a join.
async fn read_join(
    stream: &mut futures_util::stream::SplitStream<WebSocket>,
) -> Result<(String, String), &'static str> {
    match tokio::time::timeout(JOIN_TIMEOUT, stream.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => match serde_json::from_str::<ClientMsg>(&text) {
            Ok(ClientMsg::Join { nickname, color }) => Ok((nickname, color)),
            Ok(_) => Err("first message must be join"),
            Err(_) => Err("malformed join"),
        },
        Ok(_) => Err("expected a text join message"),
        Err(_) => Err("join timed out"),
    }
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    let _permit = match app_state.connection_semaphore.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!("Connection limit reached, rejecting client");
            reject(&mut sink, "server full").await;
            return;
        }
    };

    let (nickname, color) = match read_join(&mut stream).await {
        Ok(join) => join,
        Err(reason) => {
            tracing::warn!("Dropping connection: {}", reason);
            reject(&mut sink, reason).await;
            return;
        }
    };

    // Subscribe before joining so the join notices are not missed
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::PlayerJoin {
            nickname,
            color,
            response: resp_tx,
        })
        .await
        .is_err()
    {
        tracing::error!("Failed to send PlayerJoin command");
        reject(&mut sink, &GameError::LoopClosed.to_string()).await;
        return;
    }

    let (my_id, welcome) = match resp_rx.await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            reject(&mut sink, &e.to_string()).await;
            return;
        }
        Err(_) => {
            tracing::error!("Failed to receive welcome");
            reject(&mut sink, &GameError::LoopClosed.to_string()).await;
            return;
        }
    };

    tracing::info!("Player {} connected", my_id);

    let welcome_sent = match encode(&ServerMsg::Welcome(welcome)) {
        Some(frame) => sink.send(frame).await.is_ok(),
        None => false,
    };

    let mut parse_errors: u32 = 0;

    if welcome_sent {
        loop {
            tokio::select! {
                // Client -> Server
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if text.len() > MAX_MESSAGE_BYTES {
                                tracing::warn!("Player {} sent oversized message", my_id);
                                break;
                            }
                            let client_msg = match serde_json::from_str::<ClientMsg>(&text) {
                                Ok(msg) => msg,
                                Err(_) => {
                                    parse_errors += 1;
                                    if parse_errors >= MAX_PARSE_ERRORS {
                                        tracing::warn!(
                                            "Player {} sent too many bad messages",
                                            my_id
                                        );
                                        break;
                                    }
                                    continue;
                                }
                            };
                            let cmd = match client_msg {
                                ClientMsg::Move { direction, speed } => Some(GameCommand::Move {
                                    id: my_id,
                                    direction,
                                    speed,
                                }),
                                ClientMsg::Kick => Some(GameCommand::Kick { id: my_id }),
                                ClientMsg::Chat { text } => {
                                    Some(GameCommand::Chat { id: my_id, text })
                                }
                                ClientMsg::Ping { t } => {
                                    if let Some(frame) = encode(&ServerMsg::Pong(PongMsg { t })) {
                                        if sink.send(frame).await.is_err() {
                                            break;
                                        }
                                    }
                                    None
                                }
                                ClientMsg::Join { .. } => {
                                    tracing::debug!("Player {} sent a second join", my_id);
                                    None
                                }
                            };
                            if let Some(cmd) = cmd {
                                if app_state.game_tx.send(cmd).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!("Player {} socket error: {}", my_id, e);
                            break;
                        }
                        _ => {} // Ignore ping/pong/binary
                    }
                }

                // Server -> Client (broadcast)
                result = broadcast_rx.recv() => {
                    match result {
                        Ok(broadcast) => {
                            if let Some(frame) = encode(&ServerMsg::from(broadcast)) {
                                if sink.send(frame).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Player {} lagged by {} messages", my_id, n);
                            // Snapshots are full state, dropping old ones is fine
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    // Cleanup on disconnect
    let _ = app_state
        .game_tx
        .send(GameCommand::PlayerLeave { id: my_id })
        .await;
    let _ = sink.send(Message::Close(None)).await;
    tracing::info!("Player {} disconnected", my_id);
}
