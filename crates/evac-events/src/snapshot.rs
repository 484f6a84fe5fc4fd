//! Snapshot Types
//!
//! Serialization structs for per-tick world state.
//!
//! Snapshots capture every live agent and the static arena layout at one
//! point in time, for renderers and offline analysis.

use serde::{Deserialize, Serialize};

use crate::SimTimestamp;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// A 2D coordinate in arena units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f32,
    pub y: f32,
}

impl Coord {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Coord {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for [f32; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

/// Role of an agent in the crowd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Leader,
    Pedestrian,
}

/// Axis-aligned wall rectangle (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One live agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: u32,
    pub role: AgentRole,
    pub position: Coord,
    /// Exit the agent is currently heading for
    pub exit: Coord,
    /// True when a pedestrian has adopted a leader's exit
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub following: bool,
}

/// Complete world snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub snapshot_id: String,
    pub timestamp: SimTimestamp,
    pub done: bool,
    pub agents: Vec<AgentSnapshot>,
    #[serde(default)]
    pub exits: Vec<Coord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub walls: Vec<WallSnapshot>,
    #[serde(default)]
    pub evacuated: EvacuationCounts,
}

/// Agents retired through an exit so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvacuationCounts {
    pub leaders: u32,
    pub pedestrians: u32,
}

impl EvacuationCounts {
    pub fn total(&self) -> u32 {
        self.leaders + self.pedestrians
    }

    pub fn record(&mut self, role: AgentRole) {
        match role {
            AgentRole::Leader => self.leaders += 1,
            AgentRole::Pedestrian => self.pedestrians += 1,
        }
    }
}

impl WorldSnapshot {
    /// Creates a new WorldSnapshot with no agents.
    pub fn new(snapshot_id: impl Into<String>, timestamp: SimTimestamp) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            timestamp,
            done: false,
            agents: Vec::new(),
            exits: Vec::new(),
            walls: Vec::new(),
            evacuated: EvacuationCounts::default(),
        }
    }

    /// Finds an agent by ID.
    pub fn find_agent(&self, agent_id: u32) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    /// Number of live agents with the given role.
    pub fn count_role(&self, role: AgentRole) -> usize {
        self.agents.iter().filter(|a| a.role == role).count()
    }

    /// Serializes the snapshot as a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
