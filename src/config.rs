//! Configuration file handling for reelgen.
//!
//! Loads configuration from `~/.config/reelgen/config.toml` or a custom path.
//! The `FAL_API_KEY` environment variable overrides the key from the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fal::{DEFAULT_API_URL, FAL_API_KEY_ENV, PLACEHOLDER_API_KEY};

/// Default port for `reelgen serve`.
pub const DEFAULT_PORT: u16 = 3001;

/// Configuration file structure for reelgen.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
}

/// Remote video API settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_api_url")]
    pub url: String,
    /// When false the real API is never attempted.
    #[serde(default = "default_true")]
    pub enable_video_generation: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            url: default_api_url(),
            enable_video_generation: true,
        }
    }
}

impl ApiConfig {
    /// Whether a generation cycle should try the real API at all.
    pub fn is_enabled(&self) -> bool {
        self.enable_video_generation && !self.key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            public_dir: default_public_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct GalleryConfig {
    /// Directory holding the persisted gallery (default: user data dir).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_from_explicit(path)
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Load configuration from a path that must exist.
    pub fn load_from_explicit(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides (currently `FAL_API_KEY`).
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(FAL_API_KEY_ENV).ok())
    }

    /// Replace the API key when `key` is present and non-empty.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api.key = key;
        }
        self
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    NotFound {
        path: PathBuf,
    },
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound { path } => {
                write!(f, "Config file '{}' does not exist", path.display())
            }
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound { .. } => None,
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("reelgen").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/reelgen/config.toml")
        })
}

/// Contents written by `reelgen config init`.
pub fn example_config() -> String {
    format!(
        r#"# reelgen configuration
# NEVER commit a file containing a real API key!

[api]
# fal.ai API key (https://fal.ai). FAL_API_KEY in the environment or .env wins.
key = "{placeholder}"
# Mochi text-to-video endpoint
url = "{url}"
# Set to false to always use the simulated generator
enable_video_generation = true

[server]
port = {port}
public_dir = "public"

[gallery]
# Where the gallery is stored (default: user data directory)
# dir = "/path/to/gallery"
"#,
        placeholder = PLACEHOLDER_API_KEY,
        url = DEFAULT_API_URL,
        port = DEFAULT_PORT,
    )
}
