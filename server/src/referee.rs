//! Goal and score state machine.
//!
//! `Active` -> goal confirmed -> `Frozen` until the reset is due -> `Active`.
//! The ball's `active` flag mirrors the phase and guards against a second
//! goal being registered during the freeze window.

use soccer_shared::protocol::{PlayerTag, ScoreWire, Team};
use std::time::{Duration, Instant};

use crate::ball::Ball;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home,
            Team::Away => self.away,
        }
    }

    fn increment(&mut self, team: Team) {
        match team {
            Team::Home => self.home += 1,
            Team::Away => self.away += 1,
        }
    }

    pub fn to_wire(self) -> ScoreWire {
        ScoreWire {
            home: self.home,
            away: self.away,
        }
    }
}

/// Confirmed goal, emitted before the freeze window starts counting.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalEvent {
    pub team: Team,
    pub last_toucher: Option<PlayerTag>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Active,
    Frozen { scored_by: Team, reset_at: Instant },
}

#[derive(Debug)]
pub struct Referee {
    pub score: Score,
    phase: Phase,
    win_score: u32,
    reset_delay: Duration,
}

impl Referee {
    pub fn new(win_score: u32, reset_delay: Duration) -> Self {
        Self {
            score: Score::default(),
            phase: Phase::Active,
            win_score,
            reset_delay,
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.phase, Phase::Frozen { .. })
    }

    /// Register a goal for `team`. Freezes the ball and schedules the reset.
    /// Returns None if the ball is already frozen.
    pub fn confirm_goal(&mut self, team: Team, ball: &mut Ball, now: Instant) -> Option<GoalEvent> {
        if !ball.active || self.is_frozen() {
            return None;
        }

        ball.active = false;
        self.score.increment(team);
        self.phase = Phase::Frozen {
            scored_by: team,
            reset_at: now + self.reset_delay,
        };

        Some(GoalEvent {
            team,
            last_toucher: ball.last_touch.clone(),
        })
    }

    /// If the freeze window has elapsed, apply the score threshold, reactivate
    /// the ball and return the team that scored. The caller repositions the
    /// ball and players.
    pub fn take_due_reset(&mut self, ball: &mut Ball, now: Instant) -> Option<Team> {
        let Phase::Frozen {
            scored_by,
            reset_at,
        } = self.phase
        else {
            return None;
        };
        if now < reset_at {
            return None;
        }

        if self.score.get(scored_by) >= self.win_score {
            self.score = Score::default();
        }
        self.phase = Phase::Active;
        ball.active = true;
        Some(scored_by)
    }
}
