use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use reelgen::cli::{self, Args, Command};
use reelgen::fal::FAL_API_KEY_ENV;
use reelgen::generator::GenerationRequest;

/// Load the .env file (or `env_file`) into the environment.
///
/// Does not override existing environment variables.
fn load_env(env_file: Option<&Path>) {
    // A missing .env file is fine
    let _ = match env_file {
        Some(path) => dotenv::from_path(path).map(|_| ()),
        None => dotenv::dotenv().map(|_| ()),
    };
}

/// Log filter from `RUST_LOG`, or the default when unset.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reelgen=info,tower_http=info"))
}

/// Load the environment, then build the log filter so `.env` can set `RUST_LOG`.
fn prepare_logging(env_file: Option<&Path>) -> EnvFilter {
    load_env(env_file);
    env_filter()
}

fn init_logging(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging(prepare_logging(None));

    if std::env::var(FAL_API_KEY_ENV).is_err() {
        log::debug!("{} not set in environment or .env", FAL_API_KEY_ENV);
    }

    let args = Args::parse();

    let config = match cli::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Command::Generate {
            prompt,
            duration,
            style,
            resolution,
            simulate,
        } => {
            let request = GenerationRequest::new(prompt)
                .with_duration(duration)
                .with_style(style)
                .with_resolution(resolution.into());
            cli::run_generate(&config, request, simulate)
        }
        Command::Gallery { limit, all } => cli::show_gallery(&config, limit, all),
        Command::View { id } => cli::view_video(&config, id),
        Command::Serve { port, public_dir } => cli::run_server(&config, port, public_dir),
        Command::Config { action } => {
            cli::handle_config_action(action, &config, args.config.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
