//! Network-free fallback that fakes a render with a fixed progress sequence.

use std::time::Duration;

use super::request::{GenerationRequest, Resolution};
use crate::progress::ProgressObserver;

/// Delays used by the simulated cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Wait before each progress step.
    pub step_delay: Duration,
    /// Wait after the final step before the cycle completes.
    pub settle_delay: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(1500),
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl SimulationConfig {
    /// No waiting at all.
    pub fn instant() -> Self {
        Self {
            step_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
        }
    }
}

/// The seven (percent, status) steps of a simulated render.
pub fn simulated_steps(style: &str, resolution: Resolution) -> [(u8, String); 7] {
    [
        (10, "Initializing models...".to_string()),
        (25, "Analyzing your prompt...".to_string()),
        (40, "Generating video frames...".to_string()),
        (60, format!("Applying style: {}...", style)),
        (75, format!("Rendering at {}...", resolution)),
        (90, "Finalizing video...".to_string()),
        (100, "Video generated successfully!".to_string()),
    ]
}

/// Play the simulated progress sequence to completion.
pub async fn run_simulation(
    request: &GenerationRequest,
    config: &SimulationConfig,
    observer: &dyn ProgressObserver,
) {
    for (percent, status) in simulated_steps(&request.style, request.resolution) {
        tokio::time::sleep(config.step_delay).await;
        observer.progress(percent, &status);
    }
    tokio::time::sleep(config.settle_delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::GenerationEvent;

    #[test]
    fn test_steps_end_at_100_and_increase() {
        let steps = simulated_steps("anime", Resolution::Uhd4k);
        let percents: Vec<u8> = steps.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, [10, 25, 40, 60, 75, 90, 100]);
        assert_eq!(steps[3].1, "Applying style: anime...");
        assert_eq!(steps[4].1, "Rendering at 4k...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_emits_every_step_at_fixed_cadence() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let request = GenerationRequest::new("a cat surfing");
        let start = tokio::time::Instant::now();

        run_simulation(&request, &SimulationConfig::default(), &tx).await;

        assert_eq!(start.elapsed(), Duration::from_millis(7 * 1500 + 500));
        let mut percents = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                GenerationEvent::Progress { percent, .. } => percents.push(percent),
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(percents, [10, 25, 40, 60, 75, 90, 100]);
    }
}
