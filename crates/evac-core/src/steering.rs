//! Steering Primitives
//!
//! Pure per-agent motion rules. Systems feed these the current positions and
//! write the result back.

use crate::components::{LeaderView, Point};

/// Moves `speed` units from `position` straight toward `target`.
///
/// Already standing on the target is a no-op. The step is not clamped, so a
/// target closer than `speed` is overshot.
pub fn seek(position: Point, target: Point, speed: f32) -> Point {
    let offset = target - position;
    let distance = offset.length();
    if distance > 0.0 {
        position + offset / distance * speed
    } else {
        position
    }
}

/// Pushes `position` away from every peer closer than twice the collision
/// radius.
///
/// Each push is `(reach - d) / d * dampening` times the peer-to-self offset
/// and is applied before the next peer is measured, so later peers see the
/// already-displaced position. Coincident peers (d == 0) have no direction
/// and are skipped. The caller must leave the agent itself out of `peers`.
pub fn repel(
    position: Point,
    peers: impl IntoIterator<Item = Point>,
    collision_radius: f32,
    dampening: f32,
) -> Point {
    let reach = collision_radius * 2.0;
    let mut position = position;
    for peer in peers {
        let away = position - peer;
        let distance = away.length();
        if distance < reach && distance > 0.0 {
            let strength = (reach - distance) / distance;
            position += away * strength * dampening;
        }
    }
    position
}

/// Closest leader and its distance; the earliest leader wins ties.
pub fn nearest_leader(
    position: Point,
    leaders: impl IntoIterator<Item = LeaderView>,
) -> Option<(LeaderView, f32)> {
    let mut best: Option<(LeaderView, f32)> = None;
    for leader in leaders {
        let distance = position.distance(leader.position);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((leader, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_seek_moves_exactly_speed() {
        let start = Vec2::new(400.0, 300.0);
        let target = Vec2::new(200.0, 5.0);
        let next = seek(start, target, 2.0);
        assert!((start.distance(next) - 2.0).abs() < 1e-4);
        assert!(next.distance(target) < start.distance(target));
    }

    #[test]
    fn test_seek_is_monotonic() {
        let target = Vec2::new(10.0, -40.0);
        let mut position = Vec2::new(-300.0, 250.0);
        let mut last = position.distance(target);
        for _ in 0..100 {
            position = seek(position, target, 2.0);
            let now = position.distance(target);
            assert!(now < last);
            last = now;
        }
    }

    #[test]
    fn test_seek_at_target_is_noop() {
        let position = Vec2::new(123.5, 77.25);
        assert_eq!(seek(position, position, 2.0), position);
    }

    #[test]
    fn test_seek_overshoots_close_target() {
        let next = seek(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.0);
        assert!((next - Vec2::new(2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_repel_pushes_away_from_close_peer() {
        let position = Vec2::new(100.0, 100.0);
        let peer = Vec2::new(110.0, 100.0);
        let next = repel(position, [peer], 10.0, 0.1);
        // d = 10, strength = (20 - 10) / 10 = 1, push = (-10, 0) * 1 * 0.1
        assert!((next - Vec2::new(99.0, 100.0)).length() < 1e-5);
    }

    #[test]
    fn test_repel_ignores_distant_and_coincident_peers() {
        let position = Vec2::new(100.0, 100.0);
        let far = Vec2::new(120.0, 100.0);
        let same = position;
        assert_eq!(repel(position, [far, same], 10.0, 0.1), position);
    }

    #[test]
    fn test_repel_applies_pushes_in_sequence() {
        let position = Vec2::new(0.0, 0.0);
        let a = Vec2::new(10.0, 0.0);
        let b = Vec2::new(-9.0, 0.0);
        let next = repel(position, [a, b], 10.0, 0.1);

        let after_a = Vec2::new(-1.0, 0.0);
        let away_b = after_a - b;
        let d = away_b.length();
        let expected = after_a + away_b * ((20.0 - d) / d) * 0.1;
        assert!((next - expected).length() < 1e-5);
    }

    #[test]
    fn test_nearest_leader_prefers_first_on_tie() {
        let exit_a = Vec2::new(200.0, 5.0);
        let exit_b = Vec2::new(400.0, 595.0);
        let leaders = [
            LeaderView { position: Vec2::new(10.0, 0.0), target_exit: exit_a },
            LeaderView { position: Vec2::new(-10.0, 0.0), target_exit: exit_b },
            LeaderView { position: Vec2::new(50.0, 0.0), target_exit: exit_b },
        ];
        let (leader, distance) = nearest_leader(Vec2::ZERO, leaders).unwrap();
        assert_eq!(leader.target_exit, exit_a);
        assert_eq!(distance, 10.0);
        assert!(nearest_leader(Vec2::ZERO, std::iter::empty()).is_none());
    }
}
