//! fal.ai integration for the Mochi text-to-video model.
//!
//! A submission either returns the video directly or a job id that is
//! polled until the render completes, fails or times out.

mod client;
mod response;

pub use client::{
    frame_count, polling_progress, FalError, MochiClient, PollConfig, DEFAULT_API_URL,
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, FAL_API_KEY_ENV, FRAMES_PER_SECOND,
    MAX_FRAMES, PLACEHOLDER_API_KEY,
};
pub use response::{extract_job_id, extract_video_url, JobStatus, UrlField, VIDEO_URL_FIELDS};
