use soccer_shared::config::FieldConfig;
use soccer_shared::protocol::{PlayerTag, Team};
use soccer_shared::vec2::{self, Vec2};

pub const BALL_RADIUS: f64 = 10.0;
/// Per-tick velocity decay
pub const BALL_FRICTION: f64 = 0.98;
/// Velocity added when a player body pushes the ball
pub const BALL_ACCELERATION: f64 = 0.5;
pub const BALL_MASS: f64 = 1.0;
/// Velocity factor applied to the normal component on every bounce
pub const BOUNCE: f64 = -0.5;

/// The single match ball. Velocities are in pixels per tick.
#[derive(Debug, Clone)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub friction: f64,
    pub acceleration: f64,
    pub mass: f64,
    /// Visual spin, accumulated from rolling speed
    pub angle: f64,
    /// False during the post-goal freeze window
    pub active: bool,
    pub last_touch: Option<PlayerTag>,
}

impl Ball {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            friction: BALL_FRICTION,
            acceleration: BALL_ACCELERATION,
            mass: BALL_MASS,
            angle: 0.0,
            active: true,
            last_touch: None,
        }
    }

    pub fn speed(&self) -> f64 {
        vec2::length(self.vel)
    }

    /// Put the ball back on the kickoff spot at rest.
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.last_touch = None;
    }

    /// Advance one tick: integrate, apply friction, spin, then resolve the
    /// pitch boundaries. Returns the team credited with a goal if the ball
    /// went deep enough into a net. Does nothing while inactive.
    pub fn step(&mut self, field: &FieldConfig) -> Option<Team> {
        if !self.active {
            return None;
        }

        self.pos = vec2::add(self.pos, self.vel);
        self.vel = vec2::scale(self.vel, self.friction);

        let spin = self.speed() / self.radius;
        self.angle += if self.vel.x >= 0.0 { spin } else { -spin };

        let mut goal = None;
        let r = self.radius;

        // Right goal line: a goal here counts for home
        if self.pos.x + r > field.right() {
            if field.within_goal_band(self.pos.y, r) {
                if self.pos.x + r > field.right() + 2.0 * r {
                    goal = Some(Team::Home);
                }
                let back = field.right() + field.net_depth;
                if self.pos.x + r > back {
                    self.pos.x = back - r;
                    self.vel.x *= BOUNCE;
                }
                self.clamp_to_goal_mouth(field);
            } else {
                self.pos.x = field.right() - r;
                self.vel.x *= BOUNCE;
            }
        }

        // Left goal line: a goal here counts for away
        if self.pos.x - r < field.left() {
            if field.within_goal_band(self.pos.y, r) {
                if self.pos.x - r < field.left() - 2.0 * r {
                    goal = Some(Team::Away);
                }
                let back = field.left() - field.net_depth;
                if self.pos.x - r < back {
                    self.pos.x = back + r;
                    self.vel.x *= BOUNCE;
                }
                self.clamp_to_goal_mouth(field);
            } else {
                self.pos.x = field.left() + r;
                self.vel.x *= BOUNCE;
            }
        }

        if self.pos.y + r > field.bottom() {
            self.pos.y = field.bottom() - r;
            self.vel.y *= BOUNCE;
        }

        if self.pos.y - r < field.top() {
            self.pos.y = field.top() + r;
            self.vel.y *= BOUNCE;
        }

        goal
    }

    /// Keep the ball between the posts while it is inside a net.
    fn clamp_to_goal_mouth(&mut self, field: &FieldConfig) {
        let r = self.radius;
        if self.pos.y - r < field.goal_top() {
            self.pos.y = field.goal_top() + r;
            self.vel.y *= BOUNCE;
        }
        if self.pos.y + r > field.goal_bottom() {
            self.pos.y = field.goal_bottom() - r;
            self.vel.y *= BOUNCE;
        }
    }
}
