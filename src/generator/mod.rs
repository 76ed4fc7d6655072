//! Generation orchestrator: one request in, one gallery record out.

mod orchestrator;
mod request;
mod simulate;

pub use orchestrator::{CycleState, Generator, SubmitError};
pub use request::{GenerationRequest, Resolution, DEFAULT_DURATION_SECS, DEFAULT_STYLE};
pub use simulate::{run_simulation, simulated_steps, SimulationConfig};
