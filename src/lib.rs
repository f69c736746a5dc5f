//! Carveboard hover-board locomotion library
//!
//! Exposes the board controllers, their configuration and a headless rapier
//! simulation for testing and tooling.

pub mod board;
pub mod config;
pub mod scenario;
