use soccer_shared::protocol::{PlayerTag, Team};
use soccer_shared::vec2::Vec2;

pub const PLAYER_RADIUS: f64 = 20.0;
pub const PLAYER_MASS: f64 = 2.0;
/// Extra kick reach beyond touching distance
pub const PLAYER_RANGE: f64 = 10.0;

/// A connected participant.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub nickname: String,
    pub color: String,
    pub role: Role,
}

/// Whether the participant occupies a formation slot on the pitch.
#[derive(Debug, Clone)]
pub enum Role {
    /// Joined while both teams were full; has no body.
    Spectator,
    OnField(OnField),
}

/// Physical state of a player holding a formation slot.
#[derive(Debug, Clone)]
pub struct OnField {
    pub team: Team,
    pub slot: usize,
    pub pos: Vec2,
    pub radius: f64,
    pub mass: f64,
    pub range: f64,
}

impl OnField {
    pub fn new(team: Team, slot: usize, pos: Vec2) -> Self {
        Self {
            team,
            slot,
            pos,
            radius: PLAYER_RADIUS,
            mass: PLAYER_MASS,
            range: PLAYER_RANGE,
        }
    }
}

impl Player {
    pub fn team(&self) -> Option<Team> {
        self.on_field().map(|body| body.team)
    }

    pub fn on_field(&self) -> Option<&OnField> {
        match &self.role {
            Role::OnField(body) => Some(body),
            Role::Spectator => None,
        }
    }

    pub fn on_field_mut(&mut self) -> Option<&mut OnField> {
        match &mut self.role {
            Role::OnField(body) => Some(body),
            Role::Spectator => None,
        }
    }

    /// Identity snapshot that stays valid after the player leaves.
    pub fn tag(&self) -> PlayerTag {
        PlayerTag {
            id: self.id,
            nickname: self.nickname.clone(),
            color: self.color.clone(),
            team: self.team(),
        }
    }
}
