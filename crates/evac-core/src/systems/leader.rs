//! Leader Movement System

use bevy_ecs::prelude::*;

use crate::components::{AgentId, Geometry, Leader, Roster, SimClock, Steering};
use crate::steering::{repel, seek};

use super::{peer_positions, retire, Bodies};

/// Retires leaders standing at an exit; every other leader seeks its exit
/// and is then pushed off its neighbours.
pub fn step_leaders(
    mut commands: Commands,
    mut roster: ResMut<Roster>,
    mut clock: ResMut<SimClock>,
    geometry: Res<Geometry>,
    steering: Res<Steering>,
    mut bodies: Bodies,
    leaders: Query<(&AgentId, &Leader)>,
) {
    let order: Vec<Entity> = roster.leaders().to_vec();

    for entity in order {
        let Ok((id, leader)) = leaders.get(entity) else {
            continue;
        };
        let Ok((position, speed)) = bodies.get(entity) else {
            continue;
        };
        let (position, speed) = (position.0, speed.0);

        if geometry.is_at_exit(position, steering.exit_radius) {
            retire(&mut commands, &mut roster, &mut clock, entity, *id);
            continue;
        }

        let moved = seek(position, leader.target_exit, speed);
        let peers = peer_positions(&roster, &bodies, entity);
        let settled = repel(moved, peers, steering.collision_radius, steering.repulsion_dampening);

        if let Ok((mut position, _)) = bodies.get_mut(entity) {
            position.0 = settled;
        }
    }
}
