//! World Resources
//!
//! Population bookkeeping, the simulation clock, and the steering constants.

use bevy_ecs::prelude::*;

use evac_events::{AgentRole, EvacuationCounts, SimTimestamp};

use crate::config::SteeringConfig;

/// Resource: live agents in insertion order.
///
/// Systems iterate a copy of these lists and retire agents from the
/// originals, so later agents in the same tick never see a retired peer.
#[derive(Resource, Debug, Default, Clone)]
pub struct Roster {
    leaders: Vec<Entity>,
    pedestrians: Vec<Entity>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_leader(&mut self, entity: Entity) {
        self.leaders.push(entity);
    }

    pub fn add_pedestrian(&mut self, entity: Entity) {
        self.pedestrians.push(entity);
    }

    pub fn leaders(&self) -> &[Entity] {
        &self.leaders
    }

    pub fn pedestrians(&self) -> &[Entity] {
        &self.pedestrians
    }

    /// Every live agent: leaders first, then pedestrians.
    pub fn all(&self) -> impl Iterator<Item = Entity> + '_ {
        self.leaders.iter().chain(self.pedestrians.iter()).copied()
    }

    /// Removes an agent, keeping the order of the rest. Returns its role if
    /// it was live.
    pub fn remove(&mut self, entity: Entity) -> Option<AgentRole> {
        if let Some(index) = self.leaders.iter().position(|e| *e == entity) {
            self.leaders.remove(index);
            return Some(AgentRole::Leader);
        }
        if let Some(index) = self.pedestrians.iter().position(|e| *e == entity) {
            self.pedestrians.remove(index);
            return Some(AgentRole::Pedestrian);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.leaders.len() + self.pedestrians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty() && self.pedestrians.is_empty()
    }
}

/// Resource: simulated time and completion state
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    /// Tick currently being processed (or last processed, between steps)
    pub now: SimTimestamp,
    /// First tick at which the arena was empty
    pub completed_at: Option<SimTimestamp>,
    pub evacuated: EvacuationCounts,
}

impl SimClock {
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            now: SimTimestamp::new(0, ticks_per_second),
            completed_at: None,
            evacuated: EvacuationCounts::default(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Resource: movement constants shared by every agent
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub collision_radius: f32,
    pub repulsion_dampening: f32,
    pub exit_radius: f32,
    pub follow_distance: f32,
    pub leader_influence: f32,
}

impl From<&SteeringConfig> for Steering {
    fn from(config: &SteeringConfig) -> Self {
        Self {
            collision_radius: config.collision_radius,
            repulsion_dampening: config.repulsion_dampening,
            exit_radius: config.exit_radius,
            follow_distance: config.follow_distance,
            leader_influence: config.leader_influence,
        }
    }
}
