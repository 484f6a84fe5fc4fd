//! Agent Spawning
//!
//! Random placement of the initial crowd and the spawn helpers that keep the
//! ECS world and the roster in step.

use bevy_ecs::prelude::*;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{AgentId, Geometry, Leader, Pedestrian, Point, Position, Roster, Speed};
use crate::config::{ArenaConfig, ConfigError, PopulationConfig};

/// Where everyone starts, drawn before anything is spawned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationPlan {
    pub leaders: Vec<Point>,
    /// (start position, initial exit)
    pub pedestrians: Vec<(Point, Point)>,
}

/// Uniform point inside the arena, at least `spawn_margin` from every edge.
pub fn random_spawn_point(rng: &mut SmallRng, arena: &ArenaConfig) -> Point {
    let margin = arena.spawn_margin;
    let x = rng.gen_range(margin..=arena.width - margin);
    let y = rng.gen_range(margin..=arena.height - margin);
    Vec2::new(x, y)
}

/// Draws leader positions, then pedestrian positions each paired with an
/// exit chosen uniformly from the geometry.
pub fn plan_population(
    population: &PopulationConfig,
    arena: &ArenaConfig,
    geometry: &Geometry,
    rng: &mut SmallRng,
) -> Result<PopulationPlan, ConfigError> {
    let leaders = (0..population.effective_leaders())
        .map(|_| random_spawn_point(rng, arena))
        .collect();

    let mut pedestrians = Vec::with_capacity(population.pedestrians);
    for _ in 0..population.pedestrians {
        let position = random_spawn_point(rng, arena);
        let exit = *geometry.exits().choose(rng).ok_or(ConfigError::NoExits)?;
        pedestrians.push((position, exit));
    }

    Ok(PopulationPlan {
        leaders,
        pedestrians,
    })
}

/// Spawns a leader and appends it to the roster.
pub fn spawn_leader(
    world: &mut World,
    id: AgentId,
    position: Point,
    speed: f32,
    target_exit: Point,
) -> Entity {
    let entity = world
        .spawn((id, Position(position), Speed(speed), Leader::new(target_exit)))
        .id();
    world.resource_mut::<Roster>().add_leader(entity);
    entity
}

/// Spawns a pedestrian and appends it to the roster.
pub fn spawn_pedestrian(
    world: &mut World,
    id: AgentId,
    position: Point,
    speed: f32,
    initial_exit: Point,
) -> Entity {
    let entity = world
        .spawn((id, Position(position), Speed(speed), Pedestrian::new(initial_exit)))
        .id();
    world.resource_mut::<Roster>().add_pedestrian(entity);
    entity
}

/// Summary of spawned agents
pub struct SpawnSummary {
    pub leaders: usize,
    pub pedestrians: usize,
}

impl SpawnSummary {
    pub fn total(&self) -> usize {
        self.leaders + self.pedestrians
    }
}

/// Counts live agents by role
pub fn get_spawn_summary(world: &World) -> SpawnSummary {
    let roster = world.resource::<Roster>();
    SpawnSummary {
        leaders: roster.leaders().len(),
        pedestrians: roster.pedestrians().len(),
    }
}
