//! Crowd Evacuation Simulation Library
//!
//! Agents walk toward exits in an enclosed arena. Leaders head straight for
//! the exit they were assigned; pedestrians head for their own exit but adopt
//! a nearby leader's exit when the leader is not a detour. A run ends on the
//! first tick with nobody left inside.
//!
//! The world is a `bevy_ecs::World` stepped by a single-threaded schedule;
//! [`Simulation`] wraps both.

pub mod components;
pub mod config;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod steering;
pub mod systems;

pub use components::*;
pub use config::{ConfigError, EvacConfig};
pub use simulation::{SimError, Simulation, SimulationBuilder, StepResult};
