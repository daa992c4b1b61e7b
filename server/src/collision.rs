//! Circle-circle collision detection and positional correction.

use soccer_shared::vec2::{self, Vec2};

use crate::ball::Ball;
use crate::player::{OnField, Player};

/// Fraction of the mass-scaled overlap applied as correction
const CORRECTION_FACTOR: f64 = 0.5;

/// A circular rigid body as seen by the collision routines.
#[derive(Debug, Clone, Copy)]
pub struct Circle {
    pub pos: Vec2,
    pub radius: f64,
    pub mass: f64,
}

impl Circle {
    pub fn of_player(body: &OnField) -> Self {
        Self {
            pos: body.pos,
            radius: body.radius,
            mass: body.mass,
        }
    }

    pub fn of_ball(ball: &Ball) -> Self {
        Self {
            pos: ball.pos,
            radius: ball.radius,
            mass: ball.mass,
        }
    }
}

/// Check if two circles overlap. Touching circles do not collide.
#[inline]
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    vec2::distance(a.pos, b.pos) < a.radius + b.radius
}

/// Correction vector for an overlapping pair, pointing from `a` to `b`.
///
/// The magnitude is `overlap * (m1 + m2) / 2 * 0.5`. Both bodies receive the
/// full vector in opposite directions; it is not split by inverse mass.
/// Returns None if the circles do not overlap.
pub fn resolve_overlap(a: &Circle, b: &Circle) -> Option<Vec2> {
    let distance = vec2::distance(a.pos, b.pos);
    if distance >= a.radius + b.radius {
        return None;
    }

    let overlap = a.radius + b.radius - distance;
    let angle = vec2::angle_between(a.pos, b.pos);
    let force = (a.mass + b.mass) / 2.0;

    Some(vec2::scale(
        vec2::from_angle(angle),
        overlap * force * CORRECTION_FACTOR,
    ))
}

/// Push two player bodies apart.
pub fn collide_players(a: &mut OnField, b: &mut OnField) -> bool {
    match resolve_overlap(&Circle::of_player(a), &Circle::of_player(b)) {
        Some(correction) => {
            a.pos = vec2::sub(a.pos, correction);
            b.pos = vec2::add(b.pos, correction);
            true
        }
        None => false,
    }
}

/// Resolve a player body against the ball. The ball takes the full
/// correction plus a velocity nudge along it; the player recoils by half.
/// Does nothing while the ball is inactive.
pub fn collide_player_ball(body: &mut OnField, ball: &mut Ball) -> bool {
    if !ball.active {
        return false;
    }

    match resolve_overlap(&Circle::of_player(body), &Circle::of_ball(ball)) {
        Some(correction) => {
            ball.pos = vec2::add(ball.pos, correction);
            let push = vec2::scale(vec2::normalize(correction), ball.acceleration);
            ball.vel = vec2::add(ball.vel, push);
            body.pos = vec2::sub(body.pos, vec2::scale(correction, 0.5));
            true
        }
        None => false,
    }
}

/// Run one collision pass: every unordered pair of on-field players once,
/// in slice order, then each on-field player against the ball. The ball's
/// last toucher is updated on contact.
pub fn resolve_all(players: &mut [&mut Player], ball: &mut Ball) {
    for i in 0..players.len() {
        let (head, tail) = players.split_at_mut(i + 1);
        let first = &mut head[i];
        let Some(a) = first.on_field_mut() else {
            continue;
        };
        for other in tail.iter_mut() {
            if let Some(b) = other.on_field_mut() {
                collide_players(a, b);
            }
        }
    }

    for player in players.iter_mut() {
        let touched = match player.on_field_mut() {
            Some(body) => collide_player_ball(body, ball),
            None => false,
        };
        if touched {
            ball.last_touch = Some(player.tag());
        }
    }
}
