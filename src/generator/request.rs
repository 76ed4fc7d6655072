//! Generation request and resolution tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named quality tier, mapped to pixel dimensions by the API client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Resolution {
    #[default]
    Hd720,
    FullHd1080,
    Uhd4k,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Hd720, Resolution::FullHd1080, Resolution::Uhd4k];

    /// Display label, also the persisted form.
    pub fn label(self) -> &'static str {
        match self {
            Resolution::Hd720 => "720p",
            Resolution::FullHd1080 => "1080p",
            Resolution::Uhd4k => "4k",
        }
    }

    /// Parse a tier label. Unrecognized labels fall back to the lowest tier.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "1080p" => Resolution::FullHd1080,
            "4k" => Resolution::Uhd4k,
            _ => Resolution::Hd720,
        }
    }

    /// Render dimensions as `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::Hd720 => (848, 480),
            Resolution::FullHd1080 => (1280, 720),
            Resolution::Uhd4k => (1920, 1080),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Resolution {
    fn from(label: String) -> Self {
        Resolution::from_label(&label)
    }
}

impl From<Resolution> for String {
    fn from(resolution: Resolution) -> Self {
        resolution.label().to_string()
    }
}

/// Default clip length in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 10;

/// Default presentation style.
pub const DEFAULT_STYLE: &str = "realistic";

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

/// One user request to generate a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub resolution: Resolution,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            duration: DEFAULT_DURATION_SECS,
            style: DEFAULT_STYLE.to_string(),
            resolution: Resolution::default(),
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// The prompt with surrounding whitespace removed, or `None` if nothing is left.
    pub fn trimmed_prompt(&self) -> Option<&str> {
        let trimmed = self.prompt.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
