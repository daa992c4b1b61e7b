use thiserror::Error;

/// Errors surfaced by the simulation core and its configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("invalid join payload: {0}")]
    InvalidJoin(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("game loop is not running")]
    LoopClosed,
}
