//! Run Outcome Types
//!
//! The completion record produced when the last agent leaves the arena.

use serde::{Deserialize, Serialize};

use crate::SimTimestamp;

/// The population setup a run was started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub use_leaders: bool,
    pub num_pedestrians: u32,
    /// Zero whenever leaders are disabled
    pub num_leaders: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Completion record for one evacuation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvacuationOutcome {
    pub configuration: RunConfiguration,
    /// First tick at which both populations were empty
    pub completed_at: SimTimestamp,
    /// `completed_at` converted at the fixed tick cadence
    pub simulated_seconds: f64,
    /// Host-measured time, filled in by whoever drives the simulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_clock_seconds: Option<f64>,
}

impl EvacuationOutcome {
    pub fn new(configuration: RunConfiguration, completed_at: SimTimestamp) -> Self {
        Self {
            configuration,
            completed_at,
            simulated_seconds: completed_at.seconds(),
            wall_clock_seconds: None,
        }
    }

    pub fn with_wall_clock(mut self, seconds: f64) -> Self {
        self.wall_clock_seconds = Some(seconds);
        self
    }

    /// Total evacuation time, preferring the measured wall clock when present.
    pub fn total_seconds(&self) -> f64 {
        self.wall_clock_seconds.unwrap_or(self.simulated_seconds)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
