use cityview_common::{EntityId, EntityKind, Heading};
use serde::{Deserialize, Serialize};

/// One entity record inside a snapshot, already decoded from the wire.
///
/// Positions are raw server grid coordinates; the scene maps them to world
/// space when the record is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub heading: Option<Heading>,
    pub go: Option<bool>,
}

impl SnapshotRecord {
    pub fn at(id: u64, x: f32, y: f32, z: f32) -> Self {
        Self {
            id: EntityId(id),
            x,
            y,
            z,
            heading: None,
            go: None,
        }
    }

    pub fn heading(mut self, heading: Heading) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn go(mut self, go: bool) -> Self {
        self.go = Some(go);
        self
    }
}

/// A polled snapshot for one entity kind.
///
/// `seq` is stamped monotonically by the poller; the scene discards
/// snapshots that arrive out of order (a stale response completing after a
/// newer one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSnapshot {
    pub kind: EntityKind,
    pub seq: u64,
    pub records: Vec<SnapshotRecord>,
}

impl KindSnapshot {
    pub fn new(kind: EntityKind, seq: u64, records: Vec<SnapshotRecord>) -> Self {
        Self { kind, seq, records }
    }
}
