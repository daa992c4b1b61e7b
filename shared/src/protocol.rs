use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::FieldConfig;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Home,
    Away,
}

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "update")]
    Update(SnapshotMsg),
    #[serde(rename = "goal")]
    Goal(GoalMsg),
    #[serde(rename = "chat")]
    Chat(ChatMsg),
    #[serde(rename = "pong")]
    Pong(PongMsg),
    #[serde(rename = "error")]
    Error(ErrorMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub self_id: u32,
    pub field: FieldConfig,
    pub snapshot: SnapshotMsg,
}

/// Full world state: every player, the ball and the score.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SnapshotMsg {
    pub players: Vec<PlayerWire>,
    pub ball: BallWire,
    pub score: ScoreWire,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub id: u32,
    pub nickname: String,
    pub color: String,
    /// Spectators have no team, slot or body
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub slot: Option<u32>,
    #[serde(default)]
    pub pos: Option<[f64; 2]>,
    #[serde(default)]
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BallWire {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    pub radius: f64,
    /// Visual spin angle in radians
    pub angle: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreWire {
    pub home: u32,
    pub away: u32,
}

/// Identity and display data of a player, frozen at the time it was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerTag {
    pub id: u32,
    pub nickname: String,
    pub color: String,
    #[serde(default)]
    pub team: Option<Team>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GoalMsg {
    pub team: Team,
    /// Last player to touch the ball, if any
    pub author: Option<PlayerTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatMsg {
    pub entity: PlayerTag,
    pub content: ChatContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ChatContent {
    #[serde(rename = "message")]
    Message { text: String },
    #[serde(rename = "connection")]
    Connection { connected: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PongMsg {
    pub t: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorMsg {
    pub reason: String,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "join")]
    Join { nickname: String, color: String },
    #[serde(rename = "chat")]
    Chat { text: String },
    /// Displace own player by `speed` pixels along `direction` radians
    #[serde(rename = "move")]
    Move { direction: f64, speed: f64 },
    #[serde(rename = "kick")]
    Kick,
    #[serde(rename = "ping")]
    Ping { t: f64 },
}

// === Conversion helpers ===

/// Round to 2 decimal places (sub-pixel precision is enough for positions)
#[inline]
pub fn round2(v: f64) -> f64 {
    let scaled = v * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        v
    }
}

/// Round to 4 decimal places (angles, unit vectors)
#[inline]
pub fn round4(v: f64) -> f64 {
    let scaled = v * 10000.0;
    if scaled.is_finite() {
        scaled.round() / 10000.0
    } else {
        v
    }
}
