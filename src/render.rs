//! Terminal rendering of progress, previews and the gallery.

use crate::gallery::VideoRecord;
use crate::progress::NoticeLevel;

/// Width of the progress bar in characters.
const BAR_WIDTH: usize = 30;

/// Gallery titles are cut to this many characters.
const TITLE_MAX_CHARS: usize = 40;

/// Cut `text` to `max_chars` characters, appending "..." when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// `[#########.....................]  30% Video generation started...`
pub fn render_progress(percent: u8, message: &str) -> String {
    let percent = percent.min(100);
    let filled = BAR_WIDTH * usize::from(percent) / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent,
        message
    )
}

pub fn render_notice(level: NoticeLevel, message: &str) -> String {
    let tag = match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{}] {}", tag, message)
}

fn details_line(record: &VideoRecord) -> String {
    format!(
        "{}s \u{2022} {} \u{2022} {}",
        record.duration, record.style, record.resolution
    )
}

/// Main preview for one record.
///
/// Simulated records get a placeholder with a hint about configuring the
/// API key; `api_configured` picks the wording of that hint.
pub fn render_preview(record: &VideoRecord, api_configured: bool) -> String {
    match &record.video_url {
        Some(url) => format!("\u{25B6} {}\n  {}", url, details_line(record)),
        None => {
            let note = if api_configured {
                "Note: This is a demo preview. Check your fal.ai API key to generate actual videos."
            } else {
                "Note: Configure your fal.ai API key (FAL_API_KEY or config.toml) to generate actual videos."
            };
            format!(
                "Video Generated: {}\n  {}\n  {}",
                record.prompt,
                details_line(record),
                note
            )
        }
    }
}

/// Gallery listing, one entry per record.
pub fn render_gallery(records: &[VideoRecord]) -> String {
    if records.is_empty() {
        return "No videos generated yet. Create your first video with `reelgen generate`!"
            .to_string();
    }

    records
        .iter()
        .map(|record| {
            format!(
                "{}  {}\n    {} \u{2022} {}s \u{2022} {}{}",
                record.id,
                truncate_text(&record.prompt, TITLE_MAX_CHARS),
                record.date,
                record.duration,
                record.resolution,
                if record.is_playable() { "" } else { " (demo)" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
