//! Arena Geometry
//!
//! Static walls and exit points. Walls are layout data for renderers; the
//! motion model only consults the exits.

use bevy_ecs::prelude::*;
use glam::Vec2;

use evac_events::{Coord, WallSnapshot};

/// A 2D point in arena units (origin top-left, y grows downward).
pub type Point = Vec2;

/// Axis-aligned wall rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    /// Top-left corner
    pub origin: Point,
    pub size: Vec2,
}

impl Wall {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        let max = self.origin + self.size;
        point.x >= self.origin.x && point.x < max.x && point.y >= self.origin.y && point.y < max.y
    }

    pub fn to_snapshot(&self) -> WallSnapshot {
        WallSnapshot {
            x: self.origin.x,
            y: self.origin.y,
            width: self.size.x,
            height: self.size.y,
        }
    }
}

/// Resource: the arena's fixed layout. Never mutated once inserted.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    walls: Vec<Wall>,
    exits: Vec<Point>,
}

impl Geometry {
    pub fn new(width: f32, height: f32, walls: Vec<Wall>, exits: Vec<Point>) -> Self {
        Self {
            width,
            height,
            walls,
            exits,
        }
    }

    /// The standard three-exit room: one gap in the top wall a quarter of the
    /// way across, one mid-way along the bottom wall, one mid-way down the
    /// left wall. The right wall is open. Each gap spans `exit_gap` on either
    /// side of its exit point.
    pub fn standard(width: f32, height: f32, wall_thickness: f32, exit_gap: f32) -> Self {
        let t = wall_thickness;
        let top_exit = Vec2::new(width / 4.0, t / 2.0);
        let bottom_exit = Vec2::new(width / 2.0, height - t / 2.0);
        let left_exit = Vec2::new(t / 2.0, height / 2.0);

        let top_gap_end = top_exit.x + exit_gap;
        let bottom_gap_end = bottom_exit.x + exit_gap;
        let left_gap_end = left_exit.y + exit_gap;

        let walls = vec![
            Wall::new(0.0, 0.0, top_exit.x - exit_gap, t),
            Wall::new(top_gap_end, 0.0, width - top_gap_end, t),
            Wall::new(0.0, height - t, bottom_exit.x - exit_gap, t),
            Wall::new(bottom_gap_end, height - t, width - bottom_gap_end, t),
            Wall::new(0.0, 0.0, t, left_exit.y - exit_gap),
            Wall::new(0.0, left_gap_end, t, height - left_gap_end),
        ];

        Self::new(width, height, walls, vec![top_exit, bottom_exit, left_exit])
    }

    pub fn exits(&self) -> &[Point] {
        &self.exits
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Index and distance of the closest exit, first one on ties.
    pub fn nearest_exit(&self, position: Point) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (index, exit) in self.exits.iter().enumerate() {
            let distance = position.distance(*exit);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best
    }

    /// True iff `position` is strictly closer than `radius` to some exit.
    pub fn is_at_exit(&self, position: Point, radius: f32) -> bool {
        self.exits.iter().any(|exit| position.distance(*exit) < radius)
    }

    pub fn exit_coords(&self) -> Vec<Coord> {
        self.exits.iter().map(|e| Coord::new(e.x, e.y)).collect()
    }

    pub fn wall_snapshots(&self) -> Vec<WallSnapshot> {
        self.walls.iter().map(Wall::to_snapshot).collect()
    }
}
