/// 2D vector utilities for pitch-space physics.
/// Coordinates are in pixels, y grows downwards.

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shorthand constructor
pub fn vec2(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

/// Add two vectors
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x + b.x, a.y + b.y)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x - b.x, a.y - b.y)
}

/// Scale vector by scalar
pub fn scale(v: Vec2, s: f64) -> Vec2 {
    Vec2::new(v.x * s, v.y * s)
}

/// Vector length
pub fn length(v: Vec2) -> f64 {
    v.x.hypot(v.y)
}

/// Euclidean distance between two points
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    length(sub(a, b))
}

/// Normalize vector to unit length. Degenerate input maps to +x.
pub fn normalize(v: Vec2) -> Vec2 {
    let len = length(v);
    if len < 1e-10 {
        return Vec2::new(1.0, 0.0);
    }
    Vec2::new(v.x / len, v.y / len)
}

/// Unit vector pointing at `angle` radians.
pub fn from_angle(angle: f64) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the direction from `from` to `to`, in radians.
pub fn angle_between(from: Vec2, to: Vec2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn distance_is_symmetric() {
        let a = vec2(3.0, 4.0);
        let b = vec2(0.0, 0.0);
        assert!((distance(a, b) - 5.0).abs() < EPS);
        assert!((distance(b, a) - 5.0).abs() < EPS);
    }

    #[test]
    fn normalize_gives_unit_length() {
        let n = normalize(vec2(10.0, -7.0));
        assert!((length(n) - 1.0).abs() < EPS);
    }

    #[test]
    fn normalize_zero_vector_is_finite() {
        let n = normalize(Vec2::ZERO);
        assert_eq!(n, vec2(1.0, 0.0));
    }

    #[test]
    fn angle_between_points_straight_down() {
        // y grows downwards, so "below" is +PI/2
        let angle = angle_between(vec2(5.0, 0.0), vec2(5.0, 10.0));
        assert!((angle - FRAC_PI_2).abs() < EPS);
        let dir = from_angle(angle);
        assert!(dir.x.abs() < EPS);
        assert!((dir.y - 1.0).abs() < EPS);
    }

    #[test]
    fn scale_and_add_compose() {
        let v = add(vec2(1.0, 1.0), scale(vec2(2.0, -1.0), 3.0));
        assert_eq!(v, vec2(7.0, -2.0));
    }
}
