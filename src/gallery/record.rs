//! VideoRecord - one finished generation.

use serde::{Deserialize, Serialize};

use crate::generator::Resolution;

/// A generated video as shown in the gallery.
///
/// Records are created once per completed cycle and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Creation time in milliseconds since the Unix epoch.
    pub id: u64,
    pub prompt: String,
    pub duration: u32,
    pub style: String,
    pub resolution: Resolution,
    /// Creation date, display formatted (`M/D/YYYY`).
    pub date: String,
    /// Playable URL; `None` for simulated completions.
    #[serde(default)]
    pub video_url: Option<String>,
}

impl VideoRecord {
    /// Whether this record points at a real rendered video.
    pub fn is_playable(&self) -> bool {
        self.video_url.is_some()
    }
}

/// Format a local date the way the gallery displays it.
pub fn display_date(date: chrono::NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
