//! Agent Components
//!
//! Components shared by every agent, plus the two role components. An agent
//! carries exactly one of `Leader` or `Pedestrian`.

use bevy_ecs::prelude::*;

use evac_events::AgentRole;

use super::geometry::Point;

/// Stable identifier, assigned in spawn order
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

/// Component: current location in the arena
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Point);

/// Component: distance covered per tick while seeking
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Speed(pub f32);

/// Component: an agent that walks straight for the exit it was assigned
/// before the first tick.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Leader {
    pub target_exit: Point,
}

impl Leader {
    pub fn new(target_exit: Point) -> Self {
        Self { target_exit }
    }
}

/// What a pedestrian can see of a leader when deciding whether to follow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderView {
    pub position: Point,
    pub target_exit: Point,
}

/// Component: an agent that heads for its own exit but switches to a nearby
/// leader's exit when the leader is not a detour.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Pedestrian {
    /// Exit drawn at spawn
    pub initial_exit: Point,
    /// Exit currently headed for; `initial_exit` or an adopted leader's exit
    pub assigned_exit: Point,
    /// Set once a leader's exit has been adopted, never cleared
    pub following: bool,
}

impl Pedestrian {
    pub fn new(initial_exit: Point) -> Self {
        Self {
            initial_exit,
            assigned_exit: initial_exit,
            following: false,
        }
    }

    /// Picks this tick's steering target.
    ///
    /// `nearest_leader` is the closest live leader and its distance. A leader
    /// inside `follow_distance` is ignored when the assigned exit is already
    /// nearer than the leader; otherwise its exit is adopted and the target is
    /// pulled `influence` of the way from that exit toward the leader.
    pub fn choose_target(
        &mut self,
        position: Point,
        nearest_leader: Option<(LeaderView, f32)>,
        follow_distance: f32,
        influence: f32,
    ) -> Point {
        let Some((leader, leader_distance)) = nearest_leader else {
            return self.assigned_exit;
        };
        if leader_distance >= follow_distance {
            return self.assigned_exit;
        }

        if position.distance(self.assigned_exit) < leader_distance {
            return self.assigned_exit;
        }

        self.assigned_exit = leader.target_exit;
        self.following = true;
        self.assigned_exit.lerp(leader.position, influence)
    }
}

/// Role of the entity, derived from which role component it carries.
pub fn role_of(leader: Option<&Leader>) -> AgentRole {
    if leader.is_some() {
        AgentRole::Leader
    } else {
        AgentRole::Pedestrian
    }
}
