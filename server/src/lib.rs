//! Soccer server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod ball;
pub mod collision;
pub mod config;
pub mod error;
pub mod formation;
pub mod game_loop;
pub mod player;
pub mod protocol;
pub mod referee;
pub mod state;
pub mod ws;
