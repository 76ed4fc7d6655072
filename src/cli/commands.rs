//! Subcommand handlers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::args::ConfigAction;
use crate::config::{default_path as get_config_path, example_config, Config};
use crate::gallery::{default_dir, FileStore, GalleryStore};
use crate::generator::{GenerationRequest, Generator};
use crate::progress::{GenerationEvent, ProgressTracker};
use crate::render::{render_gallery, render_notice, render_preview, render_progress};
use crate::server::{self, AppState};

/// Load configuration for a command.
///
/// An explicit `--config` path must exist; a missing or broken default file
/// falls back to defaults with a warning. `FAL_API_KEY` overrides the key.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let config = match path {
        Some(path) => Config::load_from_explicit(path.to_path_buf()).map_err(|e| e.to_string())?,
        None => match Config::load(None) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Config::default()
            }
        },
    };
    Ok(config.with_env_overrides())
}

fn gallery_dir(config: &Config) -> PathBuf {
    config.gallery.dir.clone().unwrap_or_else(default_dir)
}

/// Open the persisted gallery described by `config`.
pub fn open_gallery(config: &Config) -> GalleryStore {
    GalleryStore::load_from_storage(Box::new(FileStore::new(gallery_dir(config))))
}

fn print_event(event: &GenerationEvent) {
    match event {
        GenerationEvent::Progress { percent, message } => {
            println!("{}", render_progress(*percent, message));
        }
        GenerationEvent::Notice { level, message } => {
            println!("{}", render_notice(*level, message));
        }
        GenerationEvent::Completed(_) => {}
    }
}

/// Run one generation cycle and print the result.
pub fn run_generate(config: &Config, request: GenerationRequest, simulate: bool) -> Result<(), String> {
    let mut api = config.api.clone();
    if simulate {
        api.enable_video_generation = false;
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    rt.block_on(async {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                print_event(&event);
            }
        });

        let generator = Generator::new(&api, open_gallery(config)).with_observer(Arc::new(tx));
        let uses_api = generator.uses_api();

        println!("Generating video for: \"{}\"", request.prompt.trim());
        println!();

        let result = generator.submit(request).await;

        // Dropping the generator closes the channel and lets the printer finish.
        drop(generator);
        if let Err(e) = printer.await {
            log::warn!("Progress printer stopped: {}", e);
        }

        let record = result.map_err(|e| e.to_string())?;
        println!();
        println!("{}", render_preview(&record, uses_api));
        Ok::<(), String>(())
    })
}

/// Print the newest `limit` gallery entries, or all of them.
pub fn show_gallery(config: &Config, limit: usize, all: bool) -> Result<(), String> {
    let gallery = open_gallery(config);
    let records = if all {
        gallery.records()
    } else {
        gallery.top_n(limit)
    };
    println!("{}", render_gallery(records));
    if !all && gallery.len() > records.len() {
        println!();
        println!(
            "Showing {} of {} videos. Use --all to list everything.",
            records.len(),
            gallery.len()
        );
    }
    Ok(())
}

/// Print the preview for one gallery entry.
pub fn view_video(config: &Config, id: u64) -> Result<(), String> {
    let gallery = open_gallery(config);
    let record = gallery
        .find(id)
        .ok_or_else(|| format!("No video with id {} in the gallery", id))?;
    println!("{}", render_preview(record, config.api.is_enabled()));
    Ok(())
}

/// Run the static file server and JSON API.
pub fn run_server(config: &Config, port: Option<u16>, public_dir: Option<PathBuf>) -> Result<(), String> {
    let port = port.unwrap_or(config.server.port);
    let public_dir = public_dir.unwrap_or_else(|| config.server.public_dir.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    rt.block_on(async {
        let progress = Arc::new(ProgressTracker::new());
        let generator = Arc::new(
            Generator::new(&config.api, open_gallery(config)).with_observer(progress.clone()),
        );
        println!("Server running at http://localhost:{}", port);
        println!("Serving files from: {}", public_dir.display());
        println!("Open your browser and visit: http://localhost:{}", port);
        server::serve(addr, AppState::new(public_dir, generator, progress))
            .await
            .map_err(|e| e.to_string())
    })
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config: &Config, path: Option<&Path>) -> Result<(), String> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  API URL: {}", config.api.url);
            println!(
                "  API key: {}",
                if config.api.key.trim().is_empty() { "not set" } else { "set" }
            );
            println!(
                "  Video generation: {}",
                if config.api.enable_video_generation { "enabled" } else { "disabled" }
            );
            println!("  Server port: {}", config.server.port);
            println!("  Public dir: {}", config.server.public_dir.display());
            println!("  Gallery dir: {}", gallery_dir(config).display());
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'reelgen config show' to view current settings.",
                    config_path.display()
                ));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&config_path, example_config())
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_init_writes_example_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub/config.toml");

        handle_config_action(ConfigAction::Init, &Config::default(), Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, example_config());

        let again = handle_config_action(ConfigAction::Init, &Config::default(), Some(&path));
        assert!(again.unwrap_err().contains("already exists"));
    }

    #[test]
    fn test_load_config_explicit_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let result = load_config(Some(&temp.path().join("missing.toml")));
        assert!(result.unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_open_gallery_uses_configured_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.gallery.dir = Some(temp.path().to_path_buf());

        let mut gallery = open_gallery(&config);
        assert!(gallery.is_empty());
        let record = gallery.new_record(&GenerationRequest::new("persist me"), None);
        gallery.insert(record.clone());

        let reopened = open_gallery(&config);
        assert_eq!(reopened.records(), [record]);
    }

    #[test]
    fn test_run_generate_empty_prompt_is_error() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.gallery.dir = Some(temp.path().to_path_buf());

        let err = run_generate(&config, GenerationRequest::new("  "), true).unwrap_err();
        assert_eq!(err, "Please enter a video description");
        assert!(open_gallery(&config).is_empty());
    }

    #[test]
    fn test_view_unknown_id_is_error() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.gallery.dir = Some(temp.path().to_path_buf());
        assert!(view_video(&config, 99).unwrap_err().contains("No video with id 99"));
    }
}
