use crate::vec2::Vec2;

/// Pitch geometry. The playable rectangle sits inside a margin so the goal
/// nets can extend past the touchlines.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub width: f64,
    pub height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    /// Half-height of the goal mouth
    pub goal_side: f64,
    /// How far the net extends behind the goal line
    pub net_depth: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 1100.0,
            height: 750.0,
            margin_x: 400.0,
            margin_y: 400.0,
            goal_side: 125.0,
            net_depth: 85.0,
        }
    }
}

impl FieldConfig {
    pub fn left(&self) -> f64 {
        self.margin_x
    }

    pub fn right(&self) -> f64 {
        self.margin_x + self.width
    }

    pub fn top(&self) -> f64 {
        self.margin_y
    }

    pub fn bottom(&self) -> f64 {
        self.margin_y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.margin_x + self.width / 2.0,
            self.margin_y + self.height / 2.0,
        )
    }

    /// Upper edge of the goal mouth band
    pub fn goal_top(&self) -> f64 {
        self.center().y - self.goal_side
    }

    /// Lower edge of the goal mouth band
    pub fn goal_bottom(&self) -> f64 {
        self.center().y + self.goal_side
    }

    /// True if a circle at height `y` with `radius` fits strictly inside the goal mouth.
    pub fn within_goal_band(&self, y: f64, radius: f64) -> bool {
        y - radius > self.goal_top() && y + radius < self.goal_bottom()
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("goal_side", self.goal_side),
            ("net_depth", self.net_depth),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be finite and > 0", name));
            }
        }
        if !self.margin_x.is_finite() || self.margin_x < 0.0 {
            return Err("margin_x must be finite and >= 0".to_string());
        }
        if !self.margin_y.is_finite() || self.margin_y < 0.0 {
            return Err("margin_y must be finite and >= 0".to_string());
        }
        if self.goal_side * 2.0 >= self.height {
            return Err("goal mouth must be shorter than the field height".to_string());
        }
        if self.net_depth > self.margin_x {
            return Err("net_depth must fit inside margin_x".to_string());
        }
        Ok(())
    }
}
