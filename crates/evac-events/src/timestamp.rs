//! Simulation Timestamp Types
//!
//! Simulated time is a tick counter advanced at a fixed cadence, decoupled
//! from however fast a host actually drives the simulation.
//!
//! # Example
//!
//! ```
//! use evac_events::SimTimestamp;
//!
//! let ts = SimTimestamp::new(90, 30);
//! assert_eq!(ts.tick, 90);
//! assert_eq!(ts.seconds(), 3.0);
//! assert_eq!(ts.to_string(), "tick_90@30tps");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of simulation ticks per simulated second.
pub const TICKS_PER_SECOND: u32 = 30;

/// A point in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimTimestamp {
    /// Number of completed simulation steps.
    pub tick: u64,
    /// Fixed step cadence used to convert ticks to seconds.
    pub ticks_per_second: u32,
}

impl SimTimestamp {
    pub fn new(tick: u64, ticks_per_second: u32) -> Self {
        Self {
            tick,
            ticks_per_second,
        }
    }

    /// Timestamp before the first step, at the default cadence.
    pub fn start() -> Self {
        Self::new(0, TICKS_PER_SECOND)
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Simulated seconds elapsed. A zero cadence reports zero seconds.
    pub fn seconds(&self) -> f64 {
        if self.ticks_per_second == 0 {
            return 0.0;
        }
        self.tick as f64 / self.ticks_per_second as f64
    }
}

impl Default for SimTimestamp {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick_{}@{}tps", self.tick, self.ticks_per_second)
    }
}

/// Error type for parsing a SimTimestamp from its display form.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTimestampError {
    InvalidFormat(String),
    InvalidTick(String),
    InvalidRate(String),
}

impl fmt::Display for ParseTimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTimestampError::InvalidFormat(s) => {
                write!(f, "invalid timestamp format: '{}', expected 'tick_N@Mtps'", s)
            }
            ParseTimestampError::InvalidTick(s) => write!(f, "invalid tick: '{}'", s),
            ParseTimestampError::InvalidRate(s) => write!(f, "invalid tick rate: '{}'", s),
        }
    }
}

impl std::error::Error for ParseTimestampError {}

impl FromStr for SimTimestamp {
    type Err = ParseTimestampError;

    /// Parses a timestamp like "tick_90@30tps".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tick_part, rate_part) = s
            .split_once('@')
            .ok_or_else(|| ParseTimestampError::InvalidFormat(s.to_string()))?;

        let tick = tick_part
            .strip_prefix("tick_")
            .ok_or_else(|| ParseTimestampError::InvalidFormat(s.to_string()))?
            .parse::<u64>()
            .map_err(|_| ParseTimestampError::InvalidTick(tick_part.to_string()))?;

        let ticks_per_second = rate_part
            .strip_suffix("tps")
            .ok_or_else(|| ParseTimestampError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseTimestampError::InvalidRate(rate_part.to_string()))?;

        Ok(SimTimestamp::new(tick, ticks_per_second))
    }
}
