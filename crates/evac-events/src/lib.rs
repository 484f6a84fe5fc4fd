//! Shared data types for the evacuation simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Renderers and result recorders depend on it without pulling in the engine.

pub mod outcome;
pub mod snapshot;
pub mod timestamp;

pub use timestamp::{ParseTimestampError, SimTimestamp, TICKS_PER_SECOND};

pub use outcome::{EvacuationOutcome, RunConfiguration};

pub use snapshot::{
    generate_snapshot_id, AgentRole, AgentSnapshot, Coord, EvacuationCounts, WallSnapshot,
    WorldSnapshot,
};
