//! reelgen library crate.
//!
//! Text-to-video generation through the Mochi model on fal.ai, with a
//! simulated fallback, a persisted gallery and a small web server.

pub mod cli;
pub mod config;
pub mod fal;
pub mod gallery;
pub mod generator;
pub mod progress;
pub mod render;
pub mod server;
