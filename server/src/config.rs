use soccer_shared::config::FieldConfig;
use std::time::Duration;

use crate::error::GameError;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    /// Snapshot broadcast rate; must divide `tick_rate_hz`
    pub broadcast_rate_hz: u32,
    /// Freeze window between a goal and the kickoff reset
    pub goal_reset_ms: u64,
    /// Score at which both counters go back to zero
    pub win_score: u32,
    pub max_connections: usize,
    pub field: FieldConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            tick_rate_hz: 60,
            broadcast_rate_hz: 60,
            goal_reset_ms: 2000,
            win_score: 5,
            max_connections: 64,
            field: FieldConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn goal_reset_delay(&self) -> Duration {
        Duration::from_millis(self.goal_reset_ms)
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.tick_rate_hz == 0 {
            return Err(GameError::InvalidConfig(
                "tick_rate_hz must be > 0".to_string(),
            ));
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err(GameError::InvalidConfig(
                "broadcast_rate_hz must be in 1..=tick_rate_hz".to_string(),
            ));
        }
        if self.tick_rate_hz % self.broadcast_rate_hz != 0 {
            return Err(GameError::InvalidConfig(
                "broadcast_rate_hz must divide tick_rate_hz".to_string(),
            ));
        }
        if self.win_score == 0 {
            return Err(GameError::InvalidConfig("win_score must be > 0".to_string()));
        }
        if self.max_connections == 0 {
            return Err(GameError::InvalidConfig(
                "max_connections must be > 0".to_string(),
            ));
        }
        self.field.validate().map_err(GameError::InvalidConfig)
    }
}
