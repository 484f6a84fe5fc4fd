//! World Setup
//!
//! Crowd placement, agent spawning, and leader exit assignment.

pub mod agents;
pub mod assignment;

pub use agents::*;
pub use assignment::*;
