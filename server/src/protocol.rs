//! Wire conversions for server-side entities. Message types live in the
//! shared crate and are re-exported here.

pub use soccer_shared::protocol::*;

use crate::ball::Ball;
use crate::player::{Player, Role};

impl From<&Player> for PlayerWire {
    fn from(player: &Player) -> Self {
        let (team, slot, pos, radius) = match &player.role {
            Role::OnField(body) => (
                Some(body.team),
                Some(body.slot as u32),
                Some([round2(body.pos.x), round2(body.pos.y)]),
                Some(body.radius),
            ),
            Role::Spectator => (None, None, None, None),
        };

        Self {
            id: player.id,
            nickname: player.nickname.clone(),
            color: player.color.clone(),
            team,
            slot,
            pos,
            radius,
        }
    }
}

impl From<&Ball> for BallWire {
    fn from(ball: &Ball) -> Self {
        Self {
            pos: [round2(ball.pos.x), round2(ball.pos.y)],
            vel: [round4(ball.vel.x), round4(ball.vel.y)],
            radius: ball.radius,
            angle: round4(ball.angle),
            active: ball.active,
        }
    }
}
