//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{
    handle_config_action, load_config, open_gallery, run_generate, run_server, show_gallery,
    view_video,
};
pub use enums::ResolutionArg;
