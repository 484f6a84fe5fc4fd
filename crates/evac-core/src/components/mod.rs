//! ECS Components and Resources
//!
//! Per-agent components, static arena layout, and the world bookkeeping
//! resources.

pub mod agent;
pub mod geometry;
pub mod world;

pub use agent::*;
pub use geometry::*;
pub use world::*;
