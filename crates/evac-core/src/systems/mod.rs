//! ECS Systems
//!
//! One tick is `advance_clock` → `step_leaders` → `step_pedestrians` →
//! `check_completion`, run in that order on a single thread.
//!
//! Agents are updated in place, in roster order. An agent processed later in
//! a tick sees the positions already written by agents processed earlier, and
//! never sees an agent retired earlier in the same tick.

pub mod clock;
pub mod leader;
pub mod pedestrian;

pub use clock::{advance_clock, check_completion};
pub use leader::step_leaders;
pub use pedestrian::step_pedestrians;

use bevy_ecs::prelude::*;

use crate::components::{AgentId, Point, Position, Roster, SimClock, Speed};

/// Bodies query shared by the movement systems
pub type Bodies<'w, 's> = Query<'w, 's, (&'static mut Position, &'static Speed)>;

/// Positions of every live agent except `me`, in roster order.
pub(crate) fn peer_positions(roster: &Roster, bodies: &Bodies, me: Entity) -> Vec<Point> {
    roster
        .all()
        .filter(|&other| other != me)
        .filter_map(|other| bodies.get(other).ok().map(|(position, _)| position.0))
        .collect()
}

/// Removes an agent that reached an exit from the roster and the world.
pub(crate) fn retire(
    commands: &mut Commands,
    roster: &mut Roster,
    clock: &mut SimClock,
    entity: Entity,
    id: AgentId,
) {
    let Some(role) = roster.remove(entity) else {
        return;
    };
    clock.evacuated.record(role);
    commands.entity(entity).despawn();
    tracing::debug!(
        agent = id.0,
        role = ?role,
        tick = clock.now.tick,
        "agent evacuated"
    );
}
