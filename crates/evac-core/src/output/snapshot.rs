//! Snapshot Generation
//!
//! Captures the live crowd and the arena layout, and appends snapshots to a
//! JSONL file for an external renderer.

use bevy_ecs::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use evac_events::{generate_snapshot_id, AgentSnapshot, WorldSnapshot};

use crate::components::{role_of, AgentId, Geometry, Leader, Pedestrian, Position, Roster, SimClock};

/// Resource: hands out snapshot IDs in order
#[derive(Resource, Debug, Default)]
pub struct SnapshotSequence {
    issued: u64,
}

impl SnapshotSequence {
    pub fn next_id(&mut self) -> String {
        self.issued += 1;
        generate_snapshot_id(self.issued)
    }

    pub fn count(&self) -> u64 {
        self.issued
    }
}

/// Generate a complete world snapshot. Agents are listed in roster order,
/// leaders first.
pub fn generate_snapshot(world: &mut World) -> WorldSnapshot {
    let snapshot_id = world
        .get_resource_or_insert_with(SnapshotSequence::default)
        .next_id();

    let clock = world.resource::<SimClock>();
    let mut snapshot = WorldSnapshot::new(snapshot_id, clock.now);
    snapshot.done = clock.is_done();
    snapshot.evacuated = clock.evacuated;

    let geometry = world.resource::<Geometry>();
    snapshot.exits = geometry.exit_coords();
    snapshot.walls = geometry.wall_snapshots();

    let order: Vec<Entity> = world.resource::<Roster>().all().collect();
    let mut query = world.query::<(&AgentId, &Position, Option<&Leader>, Option<&Pedestrian>)>();

    for entity in order {
        let Ok((id, position, leader, pedestrian)) = query.get(world, entity) else {
            continue;
        };
        let (exit, following) = match (leader, pedestrian) {
            (Some(leader), _) => (leader.target_exit, false),
            (None, Some(pedestrian)) => (pedestrian.assigned_exit, pedestrian.following),
            (None, None) => continue,
        };

        snapshot.agents.push(AgentSnapshot {
            agent_id: id.0,
            role: role_of(leader),
            position: position.0.to_array().into(),
            exit: exit.to_array().into(),
            following,
        });
    }

    snapshot
}

/// Appends snapshots to a JSONL file, one per line.
pub struct SnapshotWriter {
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl SnapshotWriter {
    /// Create a writer that truncates the file at `path`
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    /// Create a writer that discards snapshots
    pub fn null() -> Self {
        Self {
            writer: None,
            written: 0,
        }
    }

    pub fn write(&mut self, snapshot: &WorldSnapshot) -> std::io::Result<()> {
        self.written += 1;
        if let Some(ref mut writer) = self.writer {
            let json = snapshot.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "failed to flush snapshot writer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{spawn_leader, spawn_pedestrian};
    use evac_events::{AgentRole, Coord};
    use glam::Vec2;
    use std::io::BufRead;

    fn small_world() -> World {
        let mut world = World::new();
        world.insert_resource(Roster::new());
        world.insert_resource(SimClock::new(30));
        world.insert_resource(Geometry::standard(800.0, 600.0, 10.0, 10.0));
        spawn_leader(&mut world, AgentId(0), Vec2::new(100.0, 100.0), 2.0, Vec2::new(200.0, 5.0));
        spawn_pedestrian(&mut world, AgentId(1), Vec2::new(300.0, 300.0), 2.0, Vec2::new(5.0, 300.0));
        world
    }

    #[test]
    fn test_snapshot_lists_agents_in_roster_order() {
        let mut world = small_world();
        let snapshot = generate_snapshot(&mut world);

        assert_eq!(snapshot.snapshot_id, "snap_000001");
        assert_eq!(snapshot.timestamp.tick, 0);
        assert!(!snapshot.done);
        assert_eq!(snapshot.agents.len(), 2);
        assert_eq!(snapshot.agents[0].role, AgentRole::Leader);
        assert_eq!(snapshot.agents[0].exit, Coord::new(200.0, 5.0));
        assert_eq!(snapshot.agents[1].role, AgentRole::Pedestrian);
        assert_eq!(snapshot.agents[1].position, Coord::new(300.0, 300.0));
        assert!(!snapshot.agents[1].following);
        assert_eq!(snapshot.exits.len(), 3);
        assert_eq!(snapshot.walls.len(), 6);
    }

    #[test]
    fn test_snapshot_ids_increase() {
        let mut world = small_world();
        generate_snapshot(&mut world);
        let second = generate_snapshot(&mut world);
        assert_eq!(second.snapshot_id, "snap_000002");
        assert_eq!(world.resource::<SnapshotSequence>().count(), 2);
    }

    #[test]
    fn test_writer_appends_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.jsonl");

        let mut world = small_world();
        let mut writer = SnapshotWriter::new(&path).unwrap();
        writer.write(&generate_snapshot(&mut world)).unwrap();
        writer.write(&generate_snapshot(&mut world)).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.count(), 2);

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let parsed = WorldSnapshot::from_jsonl(&lines[1]).unwrap();
        assert_eq!(parsed.snapshot_id, "snap_000002");
        assert_eq!(parsed.agents.len(), 2);
    }

    #[test]
    fn test_null_writer_counts() {
        let mut world = small_world();
        let mut writer = SnapshotWriter::null();
        writer.write(&generate_snapshot(&mut world)).unwrap();
        assert_eq!(writer.count(), 1);
    }
}
