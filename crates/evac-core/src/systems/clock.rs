//! Clock Systems
//!
//! Tick counting and completion detection.

use bevy_ecs::prelude::*;

use crate::components::{Roster, SimClock};

/// Runs first in every tick.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.now.advance_tick();
}

/// Records the first tick that ends with nobody left in the arena.
pub fn check_completion(roster: Res<Roster>, mut clock: ResMut<SimClock>) {
    if clock.completed_at.is_some() || !roster.is_empty() {
        return;
    }
    clock.completed_at = Some(clock.now);
    tracing::info!(
        tick = clock.now.tick,
        seconds = clock.now.seconds(),
        leaders = clock.evacuated.leaders,
        pedestrians = clock.evacuated.pedestrians,
        "evacuation complete"
    );
}
