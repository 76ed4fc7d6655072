//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::ResolutionArg;
use crate::gallery::DISPLAY_LIMIT;
use crate::generator::{DEFAULT_DURATION_SECS, DEFAULT_STYLE};

/// Generate short videos from text prompts and keep them in a gallery
#[derive(Parser, Debug)]
#[command(name = "reelgen")]
#[command(version, about = "Text-to-video generation with a persistent gallery", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a video from a text prompt
    Generate {
        /// Description of the video
        prompt: String,

        /// Clip length in seconds
        #[arg(long, short, default_value_t = DEFAULT_DURATION_SECS, value_parser = clap::value_parser!(u32).range(1..))]
        duration: u32,

        /// Presentation style (passed through to the gallery)
        #[arg(long, short, default_value = DEFAULT_STYLE)]
        style: String,

        /// Output resolution
        #[arg(long, short, default_value = "720p")]
        resolution: ResolutionArg,

        /// Skip the remote API and run the simulated generator
        #[arg(long)]
        simulate: bool,
    },
    /// List recently generated videos
    Gallery {
        /// Number of videos to show
        #[arg(long, short, default_value_t = DISPLAY_LIMIT)]
        limit: usize,

        /// Show every stored video
        #[arg(long, conflicts_with = "limit")]
        all: bool,
    },
    /// Show one video from the gallery
    View {
        /// Video id (from `reelgen gallery`)
        id: u64,
    },
    /// Serve the browser front end and JSON API
    Serve {
        /// Port to listen on (default: from config, 3001)
        #[arg(long, short)]
        port: Option<u16>,

        /// Directory of static files (default: from config, ./public)
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let args = Args::parse_from(["reelgen", "generate", "a cat surfing"]);
        assert!(args.config.is_none());
        match args.command {
            Command::Generate {
                prompt,
                duration,
                style,
                resolution,
                simulate,
            } => {
                assert_eq!(prompt, "a cat surfing");
                assert_eq!(duration, 10);
                assert_eq!(style, "realistic");
                assert_eq!(resolution, ResolutionArg::Hd720);
                assert!(!simulate);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_generate_all_options() {
        let args = Args::parse_from([
            "reelgen",
            "generate",
            "city at night",
            "--duration",
            "30",
            "--style",
            "cinematic",
            "-r",
            "4k",
            "--simulate",
        ]);
        match args.command {
            Command::Generate {
                prompt,
                duration,
                style,
                resolution,
                simulate,
            } => {
                assert_eq!(prompt, "city at night");
                assert_eq!(duration, 30);
                assert_eq!(style, "cinematic");
                assert_eq!(resolution, ResolutionArg::Uhd4k);
                assert!(simulate);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_generate_rejects_zero_duration() {
        let result = Args::try_parse_from(["reelgen", "generate", "x", "--duration", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_rejects_unknown_resolution() {
        let result = Args::try_parse_from(["reelgen", "generate", "x", "--resolution", "8k"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_gallery_defaults() {
        let args = Args::parse_from(["reelgen", "gallery"]);
        assert!(matches!(
            args.command,
            Command::Gallery {
                limit: 6,
                all: false
            }
        ));
    }

    #[test]
    fn test_serve_overrides() {
        let args = Args::parse_from(["reelgen", "serve", "-p", "8080", "--public-dir", "web"]);
        match args.command {
            Command::Serve { port, public_dir } => {
                assert_eq!(port, Some(8080));
                assert_eq!(public_dir, Some(PathBuf::from("web")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let args = Args::parse_from(["reelgen", "view", "12", "--config", "/tmp/c.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(args.command, Command::View { id: 12 }));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["reelgen", "config", "init"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }
}
