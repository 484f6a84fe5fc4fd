//! Configuration System
//!
//! Loads arena, population, and steering parameters from a TOML file. Every
//! section falls back to its defaults, so a partial file is valid.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::Geometry;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvacConfig {
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub steering: SteeringConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Room dimensions and exits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
    /// Agents spawn at least this far from every edge
    pub spawn_margin: f32,
    /// Explicit exit points; the standard three-exit room when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exits: Option<Vec<[f32; 2]>>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            wall_thickness: 10.0,
            spawn_margin: 50.0,
            exits: None,
        }
    }
}

impl ArenaConfig {
    /// Builds the arena layout. Custom exits come without walls.
    pub fn geometry(&self, exit_radius: f32) -> Geometry {
        match &self.exits {
            Some(exits) => Geometry::new(
                self.width,
                self.height,
                Vec::new(),
                exits.iter().map(|&[x, y]| Vec2::new(x, y)).collect(),
            ),
            None => Geometry::standard(self.width, self.height, self.wall_thickness, exit_radius),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let margin = self.spawn_margin;
        if !(margin >= 0.0) || !(self.width - 2.0 * margin >= 0.0) || !(self.height - 2.0 * margin >= 0.0) {
            return Err(ConfigError::EmptySpawnArea {
                margin,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Who is in the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub leaders: usize,
    pub pedestrians: usize,
    /// When false no leaders are spawned, whatever `leaders` says
    pub use_leaders: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            leaders: 3,
            pedestrians: 100,
            use_leaders: true,
        }
    }
}

impl PopulationConfig {
    pub fn effective_leaders(&self) -> usize {
        if self.use_leaders {
            self.leaders
        } else {
            0
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        agent_counts(self.effective_leaders(), self.pedestrians).map(|_| ())
    }
}

/// Motion model constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Distance covered per tick, same for every agent
    pub speed: f32,
    /// Peers closer than twice this push each other apart
    pub collision_radius: f32,
    pub repulsion_dampening: f32,
    /// An agent closer than this to an exit has left
    pub exit_radius: f32,
    /// Pedestrians only consider leaders closer than this
    pub follow_distance: f32,
    /// Share of a follower's target taken from the leader's live position
    pub leader_influence: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            collision_radius: 10.0,
            repulsion_dampening: 0.1,
            exit_radius: 10.0,
            follow_distance: 75.0,
            leader_influence: 0.3,
        }
    }
}

/// Run control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for spawn positions and pedestrian exits
    pub seed: u64,
    /// A run that has not emptied the room by now is abandoned
    pub max_ticks: u64,
    pub ticks_per_second: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_ticks: 100_000,
            ticks_per_second: evac_events::TICKS_PER_SECOND,
        }
    }
}

impl EvacConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the default tuning file when present, otherwise the defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_TUNING_PATH).exists() {
            Self::from_file(DEFAULT_TUNING_PATH)
        } else {
            tracing::debug!("{} not found, using default configuration", DEFAULT_TUNING_PATH);
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn geometry(&self) -> Geometry {
        self.arena.geometry(self.steering.exit_radius)
    }

    /// Rejects configurations the motion model cannot run sensibly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_sections()?;

        let exits = self.geometry().exits().len();
        if exits == 0 {
            return Err(ConfigError::NoExits);
        }

        let leaders = self.population.effective_leaders();
        if leaders > exits {
            return Err(ConfigError::TooManyLeaders { leaders, exits });
        }

        Ok(())
    }

    /// Every check that does not depend on the exit layout.
    pub fn validate_sections(&self) -> Result<(), ConfigError> {
        self.steering.validate()?;
        self.arena.validate()?;
        self.population.validate()?;
        self.simulation.validate()
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }
}

/// Leader and pedestrian counts as `u32`, failing when the crowd is too large
/// for agent IDs to stay unique.
pub fn agent_counts(leaders: usize, pedestrians: usize) -> Result<(u32, u32), ConfigError> {
    let too_large = || ConfigError::PopulationTooLarge { leaders, pedestrians };
    let total = leaders.checked_add(pedestrians).ok_or_else(too_large)?;
    u32::try_from(total).map_err(|_| too_large())?;
    // Both fit once their sum does
    Ok((leaders as u32, pedestrians as u32))
}

impl SteeringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed > 0.0) {
            return Err(ConfigError::NonPositiveSpeed(self.speed));
        }
        for (name, value) in [
            ("collision_radius", self.collision_radius),
            ("exit_radius", self.exit_radius),
            ("follow_distance", self.follow_distance),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if !(self.repulsion_dampening >= 0.0) {
            return Err(ConfigError::NegativeDampening(self.repulsion_dampening));
        }
        if !(0.0..=1.0).contains(&self.leader_influence) {
            return Err(ConfigError::InfluenceOutOfRange(self.leader_influence));
        }
        Ok(())
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("arena has no exits")]
    NoExits,

    #[error("agent speed must be positive, got {0}")]
    NonPositiveSpeed(f32),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("repulsion dampening must not be negative, got {0}")]
    NegativeDampening(f32),

    #[error("leader influence must lie within [0, 1], got {0}")]
    InfluenceOutOfRange(f32),

    #[error("{leaders} leaders cannot each be given one of {exits} exits")]
    TooManyLeaders { leaders: usize, exits: usize },

    #[error("spawn margin {margin} leaves no room inside a {width}x{height} arena")]
    EmptySpawnArea { margin: f32, width: f32, height: f32 },

    #[error("ticks_per_second must be non-zero")]
    ZeroTickRate,

    #[error("{leaders} leaders and {pedestrians} pedestrians exceed the agent ID range")]
    PopulationTooLarge { leaders: usize, pedestrians: usize },

    #[error("{leaders} leaders were placed but leaders are disabled")]
    LeadersDisabled { leaders: usize },
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Evacuation Simulation Configuration

[arena]
width = 800.0
height = 600.0
wall_thickness = 10.0
spawn_margin = 50.0
# exits = [[200.0, 5.0], [400.0, 595.0], [5.0, 300.0]]

[population]
leaders = 3
pedestrians = 100
use_leaders = true

[steering]
speed = 2.0
collision_radius = 10.0
repulsion_dampening = 0.1
exit_radius = 10.0
follow_distance = 75.0
leader_influence = 0.3

[simulation]
seed = 42
max_ticks = 100000
ticks_per_second = 30
"#
    .to_string()
}
