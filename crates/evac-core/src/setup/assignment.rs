//! Leader Exit Assignment
//!
//! Greedy one-shot matching of leaders to distinct exits, run before the
//! first tick.

use crate::components::Point;

/// Assigns each leader a distinct exit, closest pairs first.
///
/// Each round looks at every unassigned leader's nearest remaining exit and
/// commits the shortest of those pairs, then removes that exit from the pool.
/// This is greedy, not a minimum-cost matching. Ties go to the lower leader
/// index, then the lower exit index.
///
/// Returns one entry per leader holding an index into `exits`. Leaders left
/// over once the exits run out get `None`.
pub fn assign_exits(leaders: &[Point], exits: &[Point]) -> Vec<Option<usize>> {
    let mut assignment = vec![None; leaders.len()];
    let mut remaining: Vec<usize> = (0..exits.len()).collect();
    let mut unassigned: Vec<usize> = (0..leaders.len()).collect();

    while !unassigned.is_empty() && !remaining.is_empty() {
        // (position in `unassigned`, position in `remaining`, distance)
        let mut best: Option<(usize, usize, f32)> = None;
        for (li, &leader) in unassigned.iter().enumerate() {
            for (ei, &exit) in remaining.iter().enumerate() {
                let distance = leaders[leader].distance(exits[exit]);
                if best.map_or(true, |(_, _, d)| distance < d) {
                    best = Some((li, ei, distance));
                }
            }
        }

        let Some((li, ei, distance)) = best else {
            break;
        };
        let leader = unassigned.remove(li);
        let exit = remaining.remove(ei);
        tracing::debug!(leader, exit, distance, "assigned leader exit");
        assignment[leader] = Some(exit);
    }

    assignment
}

/// Sum of leader-to-exit distances for an assignment.
pub fn assignment_cost(leaders: &[Point], exits: &[Point], assignment: &[Option<usize>]) -> f32 {
    leaders
        .iter()
        .zip(assignment)
        .filter_map(|(leader, exit)| exit.map(|e| leader.distance(exits[e])))
        .sum()
}
