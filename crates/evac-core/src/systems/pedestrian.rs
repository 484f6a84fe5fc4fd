//! Pedestrian Movement System

use bevy_ecs::prelude::*;

use crate::components::{AgentId, Geometry, Leader, LeaderView, Pedestrian, Roster, SimClock, Steering};
use crate::steering::{nearest_leader, repel, seek};

use super::{peer_positions, retire, Bodies};

/// Retires pedestrians standing at an exit. Every other pedestrian picks a
/// target (its own exit, or a blend toward a nearby leader), seeks it, and is
/// pushed off its neighbours.
pub fn step_pedestrians(
    mut commands: Commands,
    mut roster: ResMut<Roster>,
    mut clock: ResMut<SimClock>,
    geometry: Res<Geometry>,
    steering: Res<Steering>,
    mut bodies: Bodies,
    mut pedestrians: Query<(&AgentId, &mut Pedestrian)>,
    leaders: Query<&Leader>,
) {
    let order: Vec<Entity> = roster.pedestrians().to_vec();

    for entity in order {
        let Ok((id, mut pedestrian)) = pedestrians.get_mut(entity) else {
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

        let views = roster.leaders().iter().filter_map(|&leader| {
            let target_exit = leaders.get(leader).ok()?.target_exit;
            let (position, _) = bodies.get(leader).ok()?;
            Some(LeaderView {
                position: position.0,
                target_exit,
            })
        });
        let nearest = nearest_leader(position, views);
        let target = pedestrian.choose_target(
            position,
            nearest,
            steering.follow_distance,
            steering.leader_influence,
        );

        let moved = seek(position, target, speed);
        let peers = peer_positions(&roster, &bodies, entity);
        let settled = repel(moved, peers, steering.collision_radius, steering.repulsion_dampening);

        if let Ok((mut position, _)) = bodies.get_mut(entity) {
            position.0 = settled;
        }
    }
}
