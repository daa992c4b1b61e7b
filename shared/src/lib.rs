//! Types shared between the soccer server and its clients.

pub mod config;
pub mod protocol;
pub mod vec2;
