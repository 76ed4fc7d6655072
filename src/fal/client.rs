//! MochiClient - handles communication with the Mochi model on fal.ai.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use super::response::{extract_job_id, extract_video_url, first_message, JobStatus};
use crate::generator::{GenerationRequest, Resolution};
use crate::progress::ProgressObserver;

/// The environment variable name for the fal.ai API key.
pub const FAL_API_KEY_ENV: &str = "FAL_API_KEY";

/// Default endpoint for the Mochi model.
pub const DEFAULT_API_URL: &str = "https://fal.run/fal-ai/mochi-v1";

/// Key shipped in the example configuration. Never a real credential.
pub const PLACEHOLDER_API_KEY: &str = "your-fal-api-key-here";

/// Largest frame count Mochi accepts.
pub const MAX_FRAMES: u32 = 163;

/// Frames requested per second of clip.
pub const FRAMES_PER_SECOND: u32 = 6;

const NUM_INFERENCE_STEPS: u32 = 64;

const CFG_SCALE: f64 = 6.0;

/// Seeds are drawn from `0..SEED_RANGE`.
const SEED_RANGE: u32 = 1_000_000;

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default polling interval for status checks (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of status checks before giving up (about 5 minutes).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// Map a clip length to the frame count sent to the API.
pub fn frame_count(duration_secs: u32) -> u32 {
    duration_secs.saturating_mul(FRAMES_PER_SECOND).min(MAX_FRAMES)
}

/// Progress shown while a job is still processing, between 30% and 90%.
pub fn polling_progress(attempts_so_far: u32, max_attempts: u32) -> u8 {
    if max_attempts == 0 {
        return 30;
    }
    let step = u64::from(attempts_so_far.min(max_attempts)) * 60 / u64::from(max_attempts);
    30 + step as u8
}

/// Status polling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait before each status request.
    pub interval: Duration,
    /// Maximum number of status requests.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Request body for a Mochi generation.
#[derive(Debug, Serialize)]
struct MochiRequest<'a> {
    prompt: &'a str,
    num_frames: u32,
    num_inference_steps: u32,
    height: u32,
    width: u32,
    negative_prompt: &'a str,
    seed: u32,
    cfg_scale: f64,
}

impl<'a> MochiRequest<'a> {
    fn new(prompt: &'a str, duration_secs: u32, resolution: Resolution, seed: u32) -> Self {
        let (width, height) = resolution.dimensions();
        Self {
            prompt,
            num_frames: frame_count(duration_secs),
            num_inference_steps: NUM_INFERENCE_STEPS,
            height,
            width,
            negative_prompt: "",
            seed,
            cfg_scale: CFG_SCALE,
        }
    }
}

/// Client for the Mochi text-to-video endpoint.
pub struct MochiClient {
    api_key: String,
    api_url: String,
    poll: PollConfig,
    http_client: reqwest::Client,
}

impl MochiClient {
    /// Create a client for `api_url`.
    ///
    /// The key is checked when submitting, not here, so a misconfigured key
    /// surfaces as `FalError::MissingApiKey` from [`MochiClient::submit`].
    pub fn new(api_key: String, api_url: String) -> Result<Self, FalError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            poll: PollConfig::default(),
            http_client,
        })
    }

    /// Replace the polling cadence. Tests use this to avoid real waits.
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the submission URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// Whether the key is present and not the example placeholder.
    pub fn has_usable_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }

    /// Status endpoint for a job: `{api_url}/{job_id}`.
    pub fn status_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.api_url, job_id)
    }

    /// Submit a generation and resolve to a playable video URL.
    ///
    /// Polls the status endpoint when the API answers with a job id.
    ///
    /// # Errors
    ///
    /// Returns `FalError::MissingApiKey` for an empty or placeholder key,
    /// `FalError::RequestFailed` for a non-2xx submission,
    /// `FalError::UnexpectedFormat` for a 2xx body with neither job id nor URL,
    /// any polling error from [`MochiClient::poll_status`], or
    /// `FalError::Http` if the transport fails.
    pub async fn submit(
        &self,
        request: &GenerationRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<String, FalError> {
        if !self.has_usable_key() {
            return Err(FalError::MissingApiKey);
        }

        observer.progress(10, "Connecting to remote model service (via fal.ai)...");

        let seed = rand::rng().random_range(0..SEED_RANGE);
        let body = MochiRequest::new(request.prompt.trim(), request.duration, request.resolution, seed);
        log::debug!(
            "Submitting generation: {} frames at {}x{}, seed {}",
            body.num_frames,
            body.width,
            body.height,
            seed
        );

        let response = self
            .http_client
            .post(&self.api_url)
            .header("Authorization", format!("Key {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.json::<Value>().await.unwrap_or(Value::Null);
            let message = first_message(&error_body, &["message", "detail"])
                .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()));
            log::warn!("Generation request rejected ({}): {}", status, message);
            return Err(FalError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        observer.progress(30, "Video generation started...");

        let text = response.text().await?;
        let data: Value = serde_json::from_str(&text).map_err(|_| FalError::UnexpectedFormat)?;

        if let Some(job_id) = extract_job_id(&data) {
            log::info!("Generation queued, request_id: {}", job_id);
            return self.poll_status(&job_id, observer).await;
        }

        if let Some(video_url) = extract_video_url(&data) {
            observer.progress(100, "Video generated successfully!");
            return Ok(video_url);
        }

        Err(FalError::UnexpectedFormat)
    }

    /// Poll a job until it completes, fails or runs out of attempts.
    ///
    /// Each attempt waits the poll interval, then issues one GET. A job
    /// reported completed without a URL is treated as not ready yet.
    ///
    /// # Errors
    ///
    /// Returns `FalError::PollingFailed` on the first non-2xx status response,
    /// `FalError::GenerationFailed` when the job reports failure,
    /// `FalError::Timeout` once `max_attempts` requests went unanswered, or
    /// `FalError::Http` if the transport fails.
    pub async fn poll_status(
        &self,
        job_id: &str,
        observer: &dyn ProgressObserver,
    ) -> Result<String, FalError> {
        let url = self.status_url(job_id);
        let max_attempts = self.poll.max_attempts;

        for attempt in 0..max_attempts {
            tokio::time::sleep(self.poll.interval).await;

            let response = self
                .http_client
                .get(&url)
                .header("Authorization", format!("Key {}", self.api_key))
                .header("Accept", "application/json")
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                log::error!("Polling {} failed with status {}", job_id, status);
                return Err(FalError::PollingFailed {
                    status: status.as_u16(),
                });
            }

            let data: Value = response.json().await?;

            match JobStatus::from_body(&data) {
                JobStatus::Completed => {
                    if let Some(video_url) = extract_video_url(&data) {
                        observer.progress(100, "Video generated successfully!");
                        return Ok(video_url);
                    }
                    log::warn!("Job {} reported completed without a video URL, polling again", job_id);
                }
                JobStatus::Failed => {
                    let message = first_message(&data, &["error", "message"])
                        .unwrap_or_else(|| "Video generation failed".to_string());
                    return Err(FalError::GenerationFailed { message });
                }
                JobStatus::Processing => {
                    log::debug!("Job {} still processing (attempt {}/{})", job_id, attempt + 1, max_attempts);
                    observer.progress(
                        polling_progress(attempt, max_attempts),
                        "Generating video frames...",
                    );
                }
            }
        }

        log::error!("Job {} timed out after {} status checks", job_id, max_attempts);
        Err(FalError::Timeout)
    }
}

/// Errors that can occur during fal.ai operations.
#[derive(Debug, thiserror::Error)]
pub enum FalError {
    #[error("Mochi API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    RequestFailed {
        /// HTTP status of the submission response
        status: u16,
        /// Server-provided message, or a status-derived fallback
        message: String,
    },

    #[error("Unexpected API response format")]
    UnexpectedFormat,

    #[error("Polling failed: {status}")]
    PollingFailed { status: u16 },

    #[error("Generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Video generation timeout")]
    Timeout,
}
