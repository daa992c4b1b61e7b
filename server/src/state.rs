use soccer_shared::config::FieldConfig;
use soccer_shared::protocol::{ChatContent, ChatMsg, PlayerWire, SnapshotMsg, Team};
use soccer_shared::vec2;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::ball::Ball;
use crate::collision;
use crate::config::ServerConfig;
use crate::error::GameError;
use crate::formation::Formation;
use crate::player::{OnField, Player, Role};
use crate::referee::{GoalEvent, Referee, Score};

/// Fixed impulse of a kick, in pixels per tick
pub const KICK_FORCE: f64 = 10.0;
pub const MAX_NICKNAME_CHARS: usize = 24;
pub const MAX_COLOR_CHARS: usize = 32;
pub const MAX_CHAT_CHARS: usize = 280;

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub goal: Option<GoalEvent>,
    /// Set when the kickoff reset fired this tick
    pub reset: Option<Team>,
}

/// Central game state owned by the game loop task.
pub struct GameState {
    pub field: FieldConfig,
    pub ball: Ball,
    /// Keyed by connection id; ordered so collision passes are deterministic
    pub players: BTreeMap<u32, Player>,
    pub formation: Formation,
    pub referee: Referee,
    next_player_id: u32,
}

impl GameState {
    pub fn new(config: &ServerConfig) -> Self {
        let field = config.field;
        Self {
            field,
            ball: Ball::new(field.center()),
            players: BTreeMap::new(),
            formation: Formation::new(&field),
            referee: Referee::new(config.win_score, config.goal_reset_delay()),
            next_player_id: 1,
        }
    }

    /// Add a new player. Takes a formation slot if one is free, otherwise the
    /// player joins as a spectator. Returns the new player's id.
    pub fn join(&mut self, nickname: &str, color: &str) -> Result<u32, GameError> {
        let nickname = nickname.trim();
        let color = color.trim();
        if nickname.is_empty() {
            return Err(GameError::InvalidJoin("nickname is empty".to_string()));
        }
        if nickname.chars().count() > MAX_NICKNAME_CHARS {
            return Err(GameError::InvalidJoin(format!(
                "nickname longer than {} characters",
                MAX_NICKNAME_CHARS
            )));
        }
        if color.is_empty() || color.chars().count() > MAX_COLOR_CHARS {
            return Err(GameError::InvalidJoin("color is missing or too long".to_string()));
        }

        let id = self.next_player_id;
        self.next_player_id += 1;

        let role = match self.formation.allocate() {
            Some((team, slot)) => match self.formation.spawn(team, slot) {
                Some(pos) => Role::OnField(OnField::new(team, slot, pos)),
                None => Role::Spectator,
            },
            None => {
                tracing::info!("Both teams full, player {} joins as spectator", id);
                Role::Spectator
            }
        };

        self.players.insert(
            id,
            Player {
                id,
                nickname: nickname.to_string(),
                color: color.to_string(),
                role,
            },
        );
        Ok(id)
    }

    /// Remove a player and free its slot. Unknown ids are ignored.
    pub fn leave(&mut self, id: u32) -> Option<Player> {
        let player = self.players.remove(&id)?;
        if let Some(body) = player.on_field() {
            self.formation.release(body.team, body.slot);
        }
        Some(player)
    }

    /// Displace a player by `speed` pixels along `direction` radians.
    /// Returns false if nothing moved. A move that would leave the position
    /// non-finite is dropped so snapshots always serialize as numbers.
    pub fn move_player(&mut self, id: u32, direction: f64, speed: f64) -> bool {
        if !direction.is_finite() || !speed.is_finite() {
            return false;
        }
        let Some(body) = self.players.get_mut(&id).and_then(Player::on_field_mut) else {
            return false;
        };
        let pos = vec2::add(body.pos, vec2::scale(vec2::from_angle(direction), speed));
        if !pos.x.is_finite() || !pos.y.is_finite() {
            return false;
        }
        body.pos = pos;
        true
    }

    /// Kick the ball away from the player if it is within reach.
    /// Returns false if the kick had no effect.
    pub fn kick(&mut self, id: u32) -> bool {
        if !self.ball.active {
            return false;
        }
        let Some(player) = self.players.get(&id) else {
            return false;
        };
        let Some(body) = player.on_field() else {
            return false;
        };

        let reach = body.radius + self.ball.radius + body.range;
        if vec2::distance(body.pos, self.ball.pos) > reach {
            return false;
        }

        let angle = vec2::angle_between(body.pos, self.ball.pos);
        let impulse = vec2::scale(vec2::from_angle(angle), KICK_FORCE);
        self.ball.vel = vec2::add(self.ball.vel, impulse);
        self.ball.last_touch = Some(player.tag());
        true
    }

    /// Build a chat message from a player. Empty text and unknown ids yield None.
    pub fn chat(&self, id: u32, text: &str) -> Option<ChatMsg> {
        let player = self.players.get(&id)?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(ChatMsg {
            entity: player.tag(),
            content: ChatContent::Message {
                text: text.chars().take(MAX_CHAT_CHARS).collect(),
            },
        })
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if let Some(team) = self.referee.take_due_reset(&mut self.ball, now) {
            self.kickoff();
            outcome.reset = Some(team);
        }

        if let Some(team) = self.ball.step(&self.field) {
            outcome.goal = self.referee.confirm_goal(team, &mut self.ball, now);
        }

        let mut players: Vec<&mut Player> = self.players.values_mut().collect();
        collision::resolve_all(&mut players, &mut self.ball);

        outcome
    }

    /// Ball to the center spot, every on-field player back to its slot.
    fn kickoff(&mut self) {
        self.ball.place(self.field.center());
        for player in self.players.values_mut() {
            if let Some(body) = player.on_field_mut() {
                if let Some(spawn) = self.formation.spawn(body.team, body.slot) {
                    body.pos = spawn;
                }
            }
        }
    }

    pub fn score(&self) -> Score {
        self.referee.score
    }

    /// Full world snapshot for broadcasting
    pub fn snapshot(&self) -> SnapshotMsg {
        SnapshotMsg {
            players: self.players.values().map(PlayerWire::from).collect(),
            ball: (&self.ball).into(),
            score: self.referee.score.to_wire(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soccer_shared::vec2::Vec2;
    use std::collections::HashSet;
    use std::time::Duration;

    const EPS: f64 = 1e-9;

    fn test_state() -> GameState {
        GameState::new(&ServerConfig::default())
    }

    fn body(state: &GameState, id: u32) -> &OnField {
        state.players.get(&id).unwrap().on_field().unwrap()
    }

    #[test]
    fn join_places_player_on_formation_spawn() {
        let mut state = test_state();
        let id = state.join("ana", "#ff0000").unwrap();
        let b = body(&state, id);
        assert_eq!(b.team, Team::Home);
        assert_eq!(b.slot, 0);
        assert_eq!(Some(b.pos), state.formation.spawn(Team::Home, 0));
    }

    #[test]
    fn four_joiners_are_balanced() {
        let mut state = test_state();
        let ids: Vec<u32> = (0..4)
            .map(|i| state.join(&format!("p{}", i), "blue").unwrap())
            .collect();

        let teams: Vec<Team> = ids.iter().map(|id| body(&state, *id).team).collect();
        assert_eq!(teams, vec![Team::Home, Team::Away, Team::Home, Team::Away]);

        let slots: HashSet<(Team, usize)> = ids
            .iter()
            .map(|id| {
                let b = body(&state, *id);
                (b.team, b.slot)
            })
            .collect();
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn seventh_joiner_is_spectator() {
        let mut state = test_state();
        for i in 0..6 {
            state.join(&format!("p{}", i), "red").unwrap();
        }
        let id = state.join("late", "red").unwrap();
        let player = state.players.get(&id).unwrap();
        assert!(matches!(player.role, Role::Spectator));

        assert!(!state.move_player(id, 0.0, 5.0));
        assert!(!state.kick(id));

        state.leave(id);
        assert_eq!(state.formation.available_count(Team::Home), 0);
        assert_eq!(state.formation.available_count(Team::Away), 0);
    }

    #[test]
    fn malformed_join_is_rejected_without_mutation() {
        let mut state = test_state();
        assert!(matches!(
            state.join("   ", "red"),
            Err(GameError::InvalidJoin(_))
        ));
        assert!(state.join("ok", "").is_err());
        assert!(state.join(&"x".repeat(MAX_NICKNAME_CHARS + 1), "red").is_err());
        assert!(state.players.is_empty());
        assert_eq!(state.formation.available_count(Team::Home), 3);
    }

    #[test]
    fn freed_slot_is_reused_by_next_joiner() {
        let mut state = test_state();
        let ids: Vec<u32> = (0..6)
            .map(|i| state.join(&format!("p{}", i), "red").unwrap())
            .collect();
        let (team, slot) = {
            let b = body(&state, ids[3]);
            (b.team, b.slot)
        };

        state.leave(ids[3]);
        let newcomer = state.join("new", "red").unwrap();
        let b = body(&state, newcomer);
        assert_eq!((b.team, b.slot), (team, slot));

        let spectator = state.join("another", "red").unwrap();
        assert!(state.players.get(&spectator).unwrap().on_field().is_none());
    }

    #[test]
    fn repeated_leave_is_noop() {
        let mut state = test_state();
        let a = state.join("a", "red").unwrap();
        let b = state.join("b", "red").unwrap();

        assert!(state.leave(a).is_some());
        assert!(state.leave(a).is_none());
        assert_eq!(state.formation.available_count(Team::Home), 3);
        assert_eq!(state.formation.available_count(Team::Away), 2);
        assert!(state.players.contains_key(&b));
        assert_eq!(state.players.len(), 1);
    }

    #[test]
    fn actions_for_unknown_player_are_noops() {
        let mut state = test_state();
        let before = state.ball.pos;
        assert!(!state.move_player(42, 1.0, 3.0));
        assert!(!state.kick(42));
        assert!(state.chat(42, "hello").is_none());
        assert_eq!(state.ball.pos, before);
    }

    #[test]
    fn move_displaces_along_direction() {
        let mut state = test_state();
        let id = state.join("a", "red").unwrap();
        let start = body(&state, id).pos;

        assert!(state.move_player(id, std::f64::consts::FRAC_PI_2, 5.0));
        let pos = body(&state, id).pos;
        assert!((pos.x - start.x).abs() < EPS);
        assert!((pos.y - (start.y + 5.0)).abs() < EPS);

        assert!(!state.move_player(id, f64::NAN, 5.0));
        assert!(!state.move_player(id, 0.0, f64::INFINITY));
    }

    #[test]
    fn overflowing_moves_keep_snapshot_parseable() {
        use soccer_shared::protocol::ServerMsg;

        let mut state = test_state();
        let id = state.join("a", "red").unwrap();
        let start = body(&state, id).pos;

        assert!(state.move_player(id, 0.0, 1e308));
        assert!(!state.move_player(id, 0.0, 1e308));
        assert!(body(&state, id).pos.x.is_finite());
        assert_eq!(body(&state, id).pos.y, start.y);

        state.tick(Instant::now());
        let json = serde_json::to_string(&ServerMsg::Update(state.snapshot())).unwrap();
        let parsed: ServerMsg = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, ServerMsg::Update(_)));
    }

    /// Put player `id` at `pos`, bypassing movement.
    fn teleport(state: &mut GameState, id: u32, pos: Vec2) {
        state
            .players
            .get_mut(&id)
            .and_then(Player::on_field_mut)
            .unwrap()
            .pos = pos;
    }

    #[test]
    fn kick_from_above_sends_ball_down() {
        let mut state = test_state();
        let id = state.join("striker", "red").unwrap();
        let center = state.field.center();
        teleport(&mut state, id, Vec2::new(center.x, center.y - 35.0));

        assert!(state.kick(id));
        let angle = vec2::angle_between(Vec2::new(center.x, center.y - 35.0), center);
        assert!((state.ball.vel.x - angle.cos() * KICK_FORCE).abs() < EPS);
        assert!((state.ball.vel.y - angle.sin() * KICK_FORCE).abs() < EPS);
        assert!((state.ball.vel.y - KICK_FORCE).abs() < EPS);
        assert_eq!(state.ball.last_touch.as_ref().map(|t| t.id), Some(id));
    }

    #[test]
    fn kick_out_of_range_does_nothing() {
        let mut state = test_state();
        let id = state.join("striker", "red").unwrap();
        let center = state.field.center();
        teleport(&mut state, id, Vec2::new(center.x, center.y - 41.0));

        assert!(!state.kick(id));
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert!(state.ball.last_touch.is_none());
    }

    #[test]
    fn chat_attaches_sender_identity() {
        let mut state = test_state();
        let id = state.join("talker", "green").unwrap();
        let msg = state.chat(id, "  hi all ").unwrap();
        assert_eq!(msg.entity.id, id);
        assert_eq!(msg.entity.nickname, "talker");
        assert_eq!(
            msg.content,
            ChatContent::Message {
                text: "hi all".to_string()
            }
        );
        assert!(state.chat(id, "   ").is_none());
    }

    #[test]
    fn goal_freezes_then_resets_after_delay() {
        let mut state = test_state();
        let home = state.join("h", "red").unwrap();
        let away = state.join("a", "blue").unwrap();
        let home_spawn = body(&state, home).pos;
        let away_spawn = body(&state, away).pos;

        // Wander off the spawns
        state.move_player(home, 0.0, 50.0);
        state.move_player(away, 3.0, 50.0);

        let right = state.field.right();
        let cy = state.field.center().y;
        state.ball.pos = Vec2::new(right - 5.0, cy);
        state.ball.vel = Vec2::new(10.0, 0.0);

        let start = Instant::now();
        let mut goals = Vec::new();
        for i in 0..10 {
            let outcome = state.tick(start + Duration::from_millis(i * 16));
            goals.extend(outcome.goal);
        }

        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].team, Team::Home);
        assert!(!state.ball.active);
        assert_eq!(state.score().home, 1);

        let frozen_pos = state.ball.pos;
        let outcome = state.tick(start + Duration::from_millis(1000));
        assert!(outcome.reset.is_none());
        assert_eq!(state.ball.pos, frozen_pos);

        let outcome = state.tick(start + Duration::from_millis(2200));
        assert_eq!(outcome.reset, Some(Team::Home));
        assert!(state.ball.active);
        assert_eq!(state.ball.pos, state.field.center());
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert_eq!(body(&state, home).pos, home_spawn);
        assert_eq!(body(&state, away).pos, away_spawn);
        assert_eq!(state.score().home, 1);
    }

    #[test]
    fn kick_during_freeze_is_ignored() {
        let mut state = test_state();
        let id = state.join("h", "red").unwrap();
        let center = state.field.center();
        teleport(&mut state, id, Vec2::new(center.x - 30.0, center.y));
        state.ball.active = false;
        assert!(!state.kick(id));
        assert_eq!(state.ball.vel, Vec2::ZERO);
    }

    #[test]
    fn tick_pushes_ball_touched_by_player() {
        let mut state = test_state();
        let id = state.join("dribbler", "red").unwrap();
        let center = state.field.center();
        teleport(&mut state, id, Vec2::new(center.x - 25.0, center.y));

        state.tick(Instant::now());
        assert!(state.ball.pos.x > center.x);
        assert!(state.ball.vel.x > 0.0);
        assert_eq!(state.ball.last_touch.as_ref().map(|t| t.id), Some(id));
    }

    #[test]
    fn snapshot_lists_everyone() {
        let mut state = test_state();
        for i in 0..7 {
            state.join(&format!("p{}", i), "red").unwrap();
        }
        let snapshot = state.snapshot();
        assert_eq!(snapshot.players.len(), 7);
        assert_eq!(
            snapshot.players.iter().filter(|p| p.team.is_none()).count(),
            1
        );
        assert_eq!(snapshot.ball.pos, [950.0, 775.0]);
        assert_eq!(snapshot.score.home, 0);
    }
}
