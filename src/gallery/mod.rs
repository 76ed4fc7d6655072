//! Gallery of generated videos, persisted across sessions.

mod record;
mod storage;
mod store;

pub use record::{display_date, VideoRecord};
pub use storage::{default_dir, FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{GalleryStore, DISPLAY_LIMIT, GALLERY_KEY};
