//! Generator - drives one generation cycle at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::request::GenerationRequest;
use super::simulate::{run_simulation, SimulationConfig};
use crate::config::ApiConfig;
use crate::fal::{MochiClient, PollConfig};
use crate::gallery::{GalleryStore, VideoRecord};
use crate::progress::{GenerationEvent, NoProgress, NoticeLevel, ProgressObserver};

/// Whether a cycle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    InFlight,
}

/// Submission rejected before a cycle started. Shown to the user as a notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Please enter a video description")]
    EmptyPrompt,

    #[error("Duration must be at least 1 second")]
    InvalidDuration,

    #[error("Video generation in progress...")]
    InProgress,
}

/// Releases the in-flight flag however the cycle ends.
struct CycleGuard<'a> {
    in_flight: &'a AtomicBool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Orchestrates generation cycles and owns the gallery.
///
/// Only one cycle runs at a time; a second `submit` while one is in flight is
/// rejected, not queued. Failures of the remote API never surface to the
/// caller: the cycle degrades to the simulated path instead.
pub struct Generator {
    client: Option<MochiClient>,
    simulation: SimulationConfig,
    gallery: Mutex<GalleryStore>,
    in_flight: AtomicBool,
    observer: Arc<dyn ProgressObserver>,
}

impl Generator {
    /// Create a generator. The remote API is only used when `api` has a key
    /// and the feature flag is on.
    pub fn new(api: &ApiConfig, gallery: GalleryStore) -> Self {
        let client = if api.is_enabled() {
            match MochiClient::new(api.key.clone(), api.url.clone()) {
                Ok(client) => Some(client),
                Err(e) => {
                    log::error!("Failed to create Mochi client, using simulation: {}", e);
                    None
                }
            }
        } else {
            log::info!("Video API not configured, generations will be simulated");
            None
        };

        Self {
            client,
            simulation: SimulationConfig::default(),
            gallery: Mutex::new(gallery),
            in_flight: AtomicBool::new(false),
            observer: Arc::new(NoProgress),
        }
    }

    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.client = self.client.map(|c| c.with_poll_config(poll));
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Whether cycles will try the remote API before simulating.
    pub fn uses_api(&self) -> bool {
        self.client.is_some()
    }

    pub fn state(&self) -> CycleState {
        if self.in_flight.load(Ordering::Acquire) {
            CycleState::InFlight
        } else {
            CycleState::Idle
        }
    }

    /// First `n` gallery records, newest first.
    pub fn gallery_top(&self, n: usize) -> Vec<VideoRecord> {
        self.lock_gallery().top_n(n).to_vec()
    }

    pub fn gallery_len(&self) -> usize {
        self.lock_gallery().len()
    }

    pub fn find(&self, id: u64) -> Option<VideoRecord> {
        self.lock_gallery().find(id).cloned()
    }

    /// Run one generation cycle and return the record it added.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::EmptyPrompt` for a blank prompt,
    /// `SubmitError::InvalidDuration` for a zero duration and
    /// `SubmitError::InProgress` while another cycle runs. None of these
    /// touches the network or the gallery.
    pub async fn submit(&self, request: GenerationRequest) -> Result<VideoRecord, SubmitError> {
        let Some(prompt) = request.trimmed_prompt() else {
            self.observer
                .notice(NoticeLevel::Error, &SubmitError::EmptyPrompt.to_string());
            return Err(SubmitError::EmptyPrompt);
        };

        if request.duration == 0 {
            self.observer
                .notice(NoticeLevel::Error, &SubmitError::InvalidDuration.to_string());
            return Err(SubmitError::InvalidDuration);
        }

        let Some(guard) = self.begin_cycle() else {
            self.observer
                .notice(NoticeLevel::Info, &SubmitError::InProgress.to_string());
            return Err(SubmitError::InProgress);
        };

        log::info!("Starting video generation for prompt: {}", prompt);

        let video_url = match self.generate_with_api(&request).await {
            Some(url) => Some(url),
            None => {
                run_simulation(&request, &self.simulation, self.observer.as_ref()).await;
                None
            }
        };

        let record = {
            let mut gallery = self.lock_gallery();
            let record = gallery.new_record(&request, video_url);
            gallery.insert(record.clone());
            record
        };
        drop(guard);

        log::info!(
            "Generation complete (id {}, {})",
            record.id,
            if record.is_playable() { "rendered" } else { "simulated" }
        );
        self.observer
            .notice(NoticeLevel::Success, "Video generated successfully!");
        self.observer
            .on_event(GenerationEvent::Completed(record.clone()));

        Ok(record)
    }

    /// Try the remote API. `None` means the cycle must fall back to simulation.
    async fn generate_with_api(&self, request: &GenerationRequest) -> Option<String> {
        let client = self.client.as_ref()?;
        match client.submit(request, self.observer.as_ref()).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("Mochi service error, falling back to simulation: {}", e);
                self.observer
                    .notice(NoticeLevel::Error, &format!("Mochi service error: {}", e));
                None
            }
        }
    }

    fn begin_cycle(&self) -> Option<CycleGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard {
                in_flight: &self.in_flight,
            })
    }

    fn lock_gallery(&self) -> MutexGuard<'_, GalleryStore> {
        self.gallery.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::MemoryStore;
    use crate::generator::Resolution;

    fn simulated_generator() -> Generator {
        Generator::new(&ApiConfig::default(), GalleryStore::new(Box::new(MemoryStore::new())))
            .with_simulation(SimulationConfig::instant())
    }

    #[test]
    fn test_no_key_means_no_client() {
        let generator = simulated_generator();
        assert!(!generator.uses_api());
        assert_eq!(generator.state(), CycleState::Idle);
    }

    #[test]
    fn test_disabled_flag_means_no_client() {
        let api = ApiConfig {
            key: "real-key".to_string(),
            enable_video_generation: false,
            ..ApiConfig::default()
        };
        let generator = Generator::new(&api, GalleryStore::new(Box::new(MemoryStore::new())));
        assert!(!generator.uses_api());
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let generator = simulated_generator();
        for prompt in ["", "   ", "\n\t"] {
            let result = generator.submit(GenerationRequest::new(prompt)).await;
            assert_eq!(result, Err(SubmitError::EmptyPrompt));
        }
        assert_eq!(generator.state(), CycleState::Idle);
        assert_eq!(generator.gallery_len(), 0);
    }

    #[tokio::test]
    async fn test_zero_duration_is_rejected() {
        let generator = simulated_generator();
        let result = generator
            .submit(GenerationRequest::new("a cat surfing").with_duration(0))
            .await;
        assert_eq!(result, Err(SubmitError::InvalidDuration));
        assert_eq!(generator.state(), CycleState::Idle);
        assert_eq!(generator.gallery_len(), 0);

        let record = generator
            .submit(GenerationRequest::new("a cat surfing").with_duration(1))
            .await
            .unwrap();
        assert_eq!(record.duration, 1);
    }

    #[tokio::test]
    async fn test_simulated_cycle_creates_record() {
        let generator = simulated_generator();
        let request = GenerationRequest::new("a cat surfing")
            .with_duration(10)
            .with_style("realistic")
            .with_resolution(Resolution::Hd720);

        let record = generator.submit(request).await.unwrap();
        assert_eq!(record.prompt, "a cat surfing");
        assert!(record.video_url.is_none());
        assert_eq!(generator.state(), CycleState::Idle);
        assert_eq!(generator.gallery_top(6), vec![record]);
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_rejected() {
        let generator = Generator::new(
            &ApiConfig::default(),
            GalleryStore::new(Box::new(MemoryStore::new())),
        )
        .with_simulation(SimulationConfig {
            step_delay: std::time::Duration::from_millis(5),
            settle_delay: std::time::Duration::ZERO,
        });

        let (first, second) = tokio::join!(
            generator.submit(GenerationRequest::new("first")),
            generator.submit(GenerationRequest::new("second")),
        );

        assert_eq!(first.unwrap().prompt, "first");
        assert_eq!(second, Err(SubmitError::InProgress));
        assert_eq!(generator.gallery_len(), 1);
        assert_eq!(generator.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn test_find_returns_inserted_record() {
        let generator = simulated_generator();
        let record = generator.submit(GenerationRequest::new("find me")).await.unwrap();
        assert_eq!(generator.find(record.id), Some(record));
        assert_eq!(generator.find(0), None);
    }
}
