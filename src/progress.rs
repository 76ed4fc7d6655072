//! Progress events flowing from the generation core to the presentation layer.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::gallery::VideoRecord;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Event emitted while a generation cycle runs.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// Progress bar update.
    Progress { percent: u8, message: String },
    /// Transient notice (validation failures, service errors, success).
    Notice { level: NoticeLevel, message: String },
    /// A cycle finished and the record is now at the front of the gallery.
    Completed(VideoRecord),
}

/// Receives generation events.
///
/// Implementations must not block: events are delivered inline from the
/// generation task.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: GenerationEvent);

    fn progress(&self, percent: u8, message: &str) {
        self.on_event(GenerationEvent::Progress {
            percent,
            message: message.to_string(),
        });
    }

    fn notice(&self, level: NoticeLevel, message: &str) {
        self.on_event(GenerationEvent::Notice {
            level,
            message: message.to_string(),
        });
    }
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_event(&self, _event: GenerationEvent) {}
}

impl ProgressObserver for UnboundedSender<GenerationEvent> {
    fn on_event(&self, event: GenerationEvent) {
        // A closed receiver only means nobody is rendering anymore.
        let _ = self.send(event);
    }
}

/// Latest progress update of the running cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub percent: u8,
    pub message: String,
}

/// Observer that keeps only the most recent progress update.
///
/// Cleared when a cycle completes, so a snapshot is only present while a
/// cycle is running.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    latest: Mutex<Option<ProgressSnapshot>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<ProgressSnapshot> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ProgressObserver for ProgressTracker {
    fn on_event(&self, event: GenerationEvent) {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        match event {
            GenerationEvent::Progress { percent, message } => {
                *latest = Some(ProgressSnapshot { percent, message });
            }
            GenerationEvent::Completed(_) => *latest = None,
            GenerationEvent::Notice { .. } => {}
        }
    }
}
