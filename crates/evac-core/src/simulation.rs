//! Simulation Driver
//!
//! Owns the ECS world and the per-tick schedule. A `Simulation` is built once
//! from a configuration (or by hand through `SimulationBuilder`), stepped one
//! tick at a time, and reports its completion record once the arena is empty.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use evac_events::{EvacuationCounts, EvacuationOutcome, RunConfiguration, SimTimestamp, WorldSnapshot};

use crate::components::{AgentId, Geometry, Point, Roster, SimClock, Steering};
use crate::config::{agent_counts, ConfigError, EvacConfig, SteeringConfig};
use crate::output::{generate_snapshot, SnapshotSequence};
use crate::setup::{assign_exits, get_spawn_summary, plan_population, spawn_leader, spawn_pedestrian};
use crate::systems::{advance_clock, check_completion, step_leaders, step_pedestrians};

/// Errors raised while running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("tick ceiling of {ticks} reached with {remaining} agents still inside")]
    TickCeilingReached { ticks: u64, remaining: usize },
}

/// Result of advancing the world by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub done: bool,
    pub tick: u64,
}

pub struct Simulation {
    world: World,
    schedule: Schedule,
    configuration: RunConfiguration,
}

impl Simulation {
    /// Validates `config`, seeds the RNG from it and places the crowd.
    pub fn from_config(config: &EvacConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(config.simulation.seed);
        let mut simulation = Self::initialize(config, config.geometry(), &mut rng)?;
        simulation.configuration.seed = Some(config.simulation.seed);
        Ok(simulation)
    }

    /// Places leaders and pedestrians at random inside the arena, gives each
    /// pedestrian a random exit and assigns leaders their exits.
    ///
    /// `config` is checked against `geometry` rather than its own arena
    /// exits, and nothing is drawn from `rng` unless the checks pass.
    pub fn initialize(
        config: &EvacConfig,
        geometry: Geometry,
        rng: &mut SmallRng,
    ) -> Result<Self, ConfigError> {
        config.validate_sections()?;
        let exits = geometry.exits().len();
        if exits == 0 {
            return Err(ConfigError::NoExits);
        }
        let leaders = config.population.effective_leaders();
        if leaders > exits {
            return Err(ConfigError::TooManyLeaders { leaders, exits });
        }

        let plan = plan_population(&config.population, &config.arena, &geometry, rng)?;

        let mut builder = SimulationBuilder::new(geometry)
            .steering(Steering::from(&config.steering))
            .speed(config.steering.speed)
            .ticks_per_second(config.simulation.ticks_per_second)
            .use_leaders(config.population.use_leaders);
        for position in plan.leaders {
            builder = builder.leader(position);
        }
        for (position, exit) in plan.pedestrians {
            builder = builder.pedestrian(position, exit);
        }
        builder.build()
    }

    /// Advances one tick. Once done, further calls leave the world untouched.
    pub fn step(&mut self) -> StepResult {
        if !self.is_done() {
            self.schedule.run(&mut self.world);
        }
        StepResult {
            done: self.is_done(),
            tick: self.tick(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.clock().is_done()
    }

    /// Ticks processed so far
    pub fn tick(&self) -> u64 {
        self.clock().now.tick
    }

    pub fn now(&self) -> SimTimestamp {
        self.clock().now
    }

    pub fn completed_at(&self) -> Option<SimTimestamp> {
        self.clock().completed_at
    }

    /// The completion record, once the arena has emptied.
    pub fn outcome(&self) -> Option<EvacuationOutcome> {
        self.completed_at()
            .map(|at| EvacuationOutcome::new(self.configuration.clone(), at))
    }

    /// Steps until done, calling `after_tick` after every tick. Gives up with
    /// `TickCeilingReached` once `max_ticks` ticks have run.
    pub fn run_to_completion_with<F>(
        &mut self,
        max_ticks: u64,
        mut after_tick: F,
    ) -> Result<EvacuationOutcome, SimError>
    where
        F: FnMut(&mut Self),
    {
        loop {
            if let Some(outcome) = self.outcome() {
                return Ok(outcome);
            }
            if self.tick() >= max_ticks {
                let remaining = self.remaining();
                tracing::warn!(ticks = self.tick(), remaining, "tick ceiling reached");
                return Err(SimError::TickCeilingReached {
                    ticks: self.tick(),
                    remaining,
                });
            }
            self.step();
            after_tick(self);
        }
    }

    pub fn run_to_completion(&mut self, max_ticks: u64) -> Result<EvacuationOutcome, SimError> {
        self.run_to_completion_with(max_ticks, |_| {})
    }

    /// Agents still inside the arena
    pub fn remaining(&self) -> usize {
        self.world.resource::<Roster>().len()
    }

    pub fn remaining_leaders(&self) -> usize {
        self.world.resource::<Roster>().leaders().len()
    }

    pub fn remaining_pedestrians(&self) -> usize {
        self.world.resource::<Roster>().pedestrians().len()
    }

    pub fn evacuated(&self) -> EvacuationCounts {
        self.clock().evacuated
    }

    pub fn configuration(&self) -> &RunConfiguration {
        &self.configuration
    }

    pub fn geometry(&self) -> &Geometry {
        self.world.resource::<Geometry>()
    }

    pub fn snapshot(&mut self) -> WorldSnapshot {
        generate_snapshot(&mut self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn clock(&self) -> &SimClock {
        self.world.resource::<SimClock>()
    }
}

/// Builds a simulation from explicit agent placements.
///
/// Leaders get their exits from the greedy assignment when `build` runs;
/// pedestrians keep the exit they were added with.
pub struct SimulationBuilder {
    geometry: Geometry,
    steering: Steering,
    speed: f32,
    ticks_per_second: u32,
    use_leaders: Option<bool>,
    leaders: Vec<Point>,
    pedestrians: Vec<(Point, Point)>,
}

impl SimulationBuilder {
    pub fn new(geometry: Geometry) -> Self {
        let defaults = EvacConfig::default();
        Self {
            geometry,
            steering: Steering::from(&defaults.steering),
            speed: defaults.steering.speed,
            ticks_per_second: defaults.simulation.ticks_per_second,
            use_leaders: None,
            leaders: Vec::new(),
            pedestrians: Vec::new(),
        }
    }

    pub fn steering(mut self, steering: Steering) -> Self {
        self.steering = steering;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn ticks_per_second(mut self, ticks_per_second: u32) -> Self {
        self.ticks_per_second = ticks_per_second;
        self
    }

    /// Overrides the flag reported in the completion record, which otherwise
    /// says whether any leader was added. `build` fails when this is false
    /// and leaders were added.
    pub fn use_leaders(mut self, use_leaders: bool) -> Self {
        self.use_leaders = Some(use_leaders);
        self
    }

    pub fn leader(mut self, position: Point) -> Self {
        self.leaders.push(position);
        self
    }

    pub fn pedestrian(mut self, position: Point, exit: Point) -> Self {
        self.pedestrians.push((position, exit));
        self
    }

    pub fn build(self) -> Result<Simulation, ConfigError> {
        let exits = self.geometry.exits().to_vec();
        if exits.is_empty() {
            return Err(ConfigError::NoExits);
        }
        SteeringConfig {
            speed: self.speed,
            collision_radius: self.steering.collision_radius,
            repulsion_dampening: self.steering.repulsion_dampening,
            exit_radius: self.steering.exit_radius,
            follow_distance: self.steering.follow_distance,
            leader_influence: self.steering.leader_influence,
        }
        .validate()?;
        if self.ticks_per_second == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        let (num_leaders, num_pedestrians) = agent_counts(self.leaders.len(), self.pedestrians.len())?;
        if self.use_leaders == Some(false) && !self.leaders.is_empty() {
            return Err(ConfigError::LeadersDisabled {
                leaders: self.leaders.len(),
            });
        }

        let mut targets = Vec::with_capacity(self.leaders.len());
        for slot in assign_exits(&self.leaders, &exits) {
            match slot {
                Some(index) => targets.push(exits[index]),
                None => {
                    return Err(ConfigError::TooManyLeaders {
                        leaders: self.leaders.len(),
                        exits: exits.len(),
                    })
                }
            }
        }

        let configuration = RunConfiguration {
            use_leaders: self.use_leaders.unwrap_or(!self.leaders.is_empty()),
            num_pedestrians,
            num_leaders,
            seed: None,
        };

        let mut world = World::new();
        world.insert_resource(self.geometry);
        world.insert_resource(self.steering);
        world.insert_resource(Roster::new());
        world.insert_resource(SimClock::new(self.ticks_per_second));
        world.insert_resource(SnapshotSequence::default());

        let mut next_id = 0u32;
        for (position, target) in self.leaders.iter().zip(targets) {
            spawn_leader(&mut world, AgentId(next_id), *position, self.speed, target);
            next_id += 1;
        }
        for (position, exit) in &self.pedestrians {
            spawn_pedestrian(&mut world, AgentId(next_id), *position, self.speed, *exit);
            next_id += 1;
        }

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((advance_clock, step_leaders, step_pedestrians, check_completion).chain());

        let summary = get_spawn_summary(&world);
        tracing::info!(
            leaders = summary.leaders,
            pedestrians = summary.pedestrians,
            total = summary.total(),
            exits = exits.len(),
            "world initialized"
        );

        Ok(Simulation {
            world,
            schedule,
            configuration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn two_exit_geometry() -> Geometry {
        Geometry::new(800.0, 600.0, vec![], vec![Vec2::new(200.0, 5.0), Vec2::new(600.0, 5.0)])
    }

    #[test]
    fn test_from_default_config() {
        let sim = Simulation::from_config(&EvacConfig::default()).unwrap();
        assert_eq!(sim.remaining_leaders(), 3);
        assert_eq!(sim.remaining_pedestrians(), 100);
        assert_eq!(sim.tick(), 0);
        assert!(!sim.is_done());
        assert_eq!(sim.configuration().seed, Some(42));
        assert!(sim.configuration().use_leaders);
    }

    #[test]
    fn test_leaders_get_distinct_exits() {
        let mut sim = Simulation::from_config(&EvacConfig::default()).unwrap();
        let snapshot = sim.snapshot();
        let mut exits: Vec<[f32; 2]> = snapshot
            .agents
            .iter()
            .filter(|a| a.role == evac_events::AgentRole::Leader)
            .map(|a| a.exit.into())
            .collect();
        assert_eq!(exits.len(), 3);
        exits.sort_by(|a, b| a.partial_cmp(b).unwrap());
        exits.dedup();
        assert_eq!(exits.len(), 3);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = EvacConfig::default();
        config.steering.speed = 0.0;
        assert!(matches!(
            Simulation::from_config(&config),
            Err(ConfigError::NonPositiveSpeed(_))
        ));
    }

    #[test]
    fn test_builder_rejects_more_leaders_than_exits() {
        let result = SimulationBuilder::new(two_exit_geometry())
            .leader(Vec2::new(100.0, 100.0))
            .leader(Vec2::new(200.0, 100.0))
            .leader(Vec2::new(300.0, 100.0))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::TooManyLeaders { leaders: 3, exits: 2 })
        ));
    }

    #[test]
    fn test_builder_rejects_no_exits() {
        let result = SimulationBuilder::new(Geometry::new(800.0, 600.0, vec![], vec![])).build();
        assert!(matches!(result, Err(ConfigError::NoExits)));
    }

    #[test]
    fn test_initialize_rejects_oversized_margin() {
        let mut config = EvacConfig::default();
        config.arena.spawn_margin = 500.0;
        let mut rng = SmallRng::seed_from_u64(1);
        let result = Simulation::initialize(&config, config.geometry(), &mut rng);
        assert!(matches!(result, Err(ConfigError::EmptySpawnArea { .. })));
    }

    #[test]
    fn test_initialize_rejects_bad_steering() {
        let mut config = EvacConfig::default();
        config.steering.leader_influence = 7.0;
        let mut rng = SmallRng::seed_from_u64(1);
        let result = Simulation::initialize(&config, config.geometry(), &mut rng);
        assert!(matches!(result, Err(ConfigError::InfluenceOutOfRange(_))));

        let mut config = EvacConfig::default();
        config.steering.collision_radius = -5.0;
        let result = Simulation::initialize(&config, config.geometry(), &mut rng);
        assert!(matches!(
            result,
            Err(ConfigError::NonPositive { name: "collision_radius", .. })
        ));
    }

    #[test]
    fn test_initialize_checks_the_given_geometry() {
        let config = EvacConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let result = Simulation::initialize(&config, two_exit_geometry(), &mut rng);
        assert!(matches!(
            result,
            Err(ConfigError::TooManyLeaders { leaders: 3, exits: 2 })
        ));

        let mut config = EvacConfig::default();
        config.population.leaders = 2;
        let sim = Simulation::initialize(&config, two_exit_geometry(), &mut rng).unwrap();
        assert_eq!(sim.remaining_leaders(), 2);
        assert_eq!(sim.configuration().seed, None);
    }

    #[test]
    fn test_builder_rejects_bad_steering() {
        let mut steering = Steering::from(&SteeringConfig::default());
        steering.repulsion_dampening = -1.0;
        let result = SimulationBuilder::new(two_exit_geometry())
            .steering(steering)
            .build();
        assert!(matches!(result, Err(ConfigError::NegativeDampening(_))));

        let result = SimulationBuilder::new(two_exit_geometry()).speed(0.0).build();
        assert!(matches!(result, Err(ConfigError::NonPositiveSpeed(_))));
    }

    #[test]
    fn test_builder_rejects_leaders_when_disabled() {
        let result = SimulationBuilder::new(two_exit_geometry())
            .use_leaders(false)
            .leader(Vec2::new(100.0, 100.0))
            .build();
        assert!(matches!(result, Err(ConfigError::LeadersDisabled { leaders: 1 })));

        let sim = SimulationBuilder::new(two_exit_geometry())
            .use_leaders(false)
            .pedestrian(Vec2::new(100.0, 100.0), Vec2::new(200.0, 5.0))
            .build()
            .unwrap();
        assert!(!sim.configuration().use_leaders);
        assert_eq!(sim.configuration().num_leaders, 0);
    }

    #[test]
    fn test_empty_world_completes_on_first_tick() {
        let mut sim = SimulationBuilder::new(two_exit_geometry()).build().unwrap();
        let result = sim.step();
        assert_eq!(result, StepResult { done: true, tick: 1 });
        assert!(!sim.configuration().use_leaders);
    }

    #[test]
    fn test_step_is_idempotent_once_done() {
        let mut sim = SimulationBuilder::new(two_exit_geometry())
            .pedestrian(Vec2::new(200.0, 12.0), Vec2::new(200.0, 5.0))
            .build()
            .unwrap();

        let first = sim.step();
        assert!(first.done);
        assert_eq!(first.tick, 1);

        let again = sim.step();
        assert_eq!(again, first);
        assert!(sim.is_done());
        assert_eq!(sim.completed_at().map(|t| t.tick), Some(1));
        assert_eq!(sim.evacuated().pedestrians, 1);
    }

    #[test]
    fn test_tick_ceiling() {
        let mut sim = SimulationBuilder::new(two_exit_geometry())
            .pedestrian(Vec2::new(400.0, 500.0), Vec2::new(200.0, 5.0))
            .build()
            .unwrap();

        let err = sim.run_to_completion(10).unwrap_err();
        assert!(matches!(
            err,
            SimError::TickCeilingReached { ticks: 10, remaining: 1 }
        ));
    }

    #[test]
    fn test_run_to_completion_reports_outcome() {
        let mut sim = SimulationBuilder::new(two_exit_geometry())
            .pedestrian(Vec2::new(200.0, 45.0), Vec2::new(200.0, 5.0))
            .build()
            .unwrap();

        let mut observed = 0;
        let outcome = sim
            .run_to_completion_with(1_000, |_| observed += 1)
            .unwrap();

        // 40 away, 2 per tick: under the radius after 16 moves, retired on the 17th tick
        assert_eq!(outcome.completed_at.tick, 17);
        assert_eq!(observed, 17);
        assert!((outcome.simulated_seconds - 17.0 / 30.0).abs() < 1e-9);
        assert_eq!(outcome.configuration.num_pedestrians, 1);
        assert_eq!(outcome.configuration.num_leaders, 0);
    }
}
