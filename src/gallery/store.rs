//! GalleryStore - ordered, persisted list of generated videos.

use super::record::{display_date, VideoRecord};
use super::storage::KeyValueStore;
use crate::generator::GenerationRequest;

/// Storage key holding the serialized gallery.
pub const GALLERY_KEY: &str = "video_gallery";

/// Number of records the gallery view shows.
pub const DISPLAY_LIMIT: usize = 6;

/// Newest-first list of video records, mirrored to a [`KeyValueStore`].
///
/// The in-memory list is authoritative: storage failures are logged and
/// never change what the store holds.
pub struct GalleryStore {
    records: Vec<VideoRecord>,
    storage: Box<dyn KeyValueStore>,
}

impl GalleryStore {
    /// Create an empty gallery without reading storage.
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            records: Vec::new(),
            storage,
        }
    }

    /// Load the persisted gallery.
    ///
    /// Missing, unreadable or malformed data yields an empty gallery.
    pub fn load_from_storage(storage: Box<dyn KeyValueStore>) -> Self {
        let records = match storage.get(GALLERY_KEY) {
            Ok(Some(serialized)) => match serde_json::from_str::<Vec<VideoRecord>>(&serialized) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Ignoring malformed gallery data: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to load gallery: {}", e);
                Vec::new()
            }
        };
        log::debug!("Loaded {} gallery records", records.len());
        Self { records, storage }
    }

    /// Build the record for a finished cycle. Does not insert it.
    ///
    /// The id is the current time in milliseconds, bumped past the newest
    /// record's id so ids stay strictly increasing.
    pub fn new_record(&self, request: &GenerationRequest, video_url: Option<String>) -> VideoRecord {
        let now = chrono::Local::now();
        let mut id = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        if let Some(newest) = self.records.first() {
            id = id.max(newest.id.saturating_add(1));
        }

        VideoRecord {
            id,
            prompt: request.prompt.trim().to_string(),
            duration: request.duration,
            style: request.style.clone(),
            resolution: request.resolution,
            date: display_date(now.date_naive()),
            video_url,
        }
    }

    /// Put a record at the front and persist the whole list.
    pub fn insert(&mut self, record: VideoRecord) {
        self.records.insert(0, record);
        self.persist();
    }

    /// First `n` records, newest first.
    pub fn top_n(&self, n: usize) -> &[VideoRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn find(&self, id: u64) -> Option<&VideoRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.records) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Failed to serialize gallery: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(GALLERY_KEY, &serialized) {
            log::error!("Failed to save gallery: {}", e);
        }
    }
}

impl std::fmt::Debug for GalleryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryStore")
            .field("records", &self.records.len())
            .finish()
    }
}
