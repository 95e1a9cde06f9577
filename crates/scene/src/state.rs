use crate::entity::{Entity, KindData};
use crate::snapshot::{KindSnapshot, SnapshotRecord};
use cityview_common::{grid_to_world, EntityId, EntityKind, GridExtent, Heading};
use std::collections::BTreeMap;

/// Per-session scene behavior.
#[derive(Debug, Clone, Copy)]
pub struct SceneConfig {
    /// Duration of one interpolation span, in milliseconds.
    pub interpolation_ms: f32,
    /// Arm interpolation for signals instead of snapping their positions.
    pub interpolate_signals: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            interpolation_ms: 200.0,
            interpolate_signals: false,
        }
    }
}

/// Result of applying one snapshot to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        added: usize,
        updated: usize,
        removed: usize,
    },
    /// The snapshot was older than one already applied for this kind.
    Stale { seq: u64, last_seq: u64 },
}

/// The live entity sets, one map per kind.
///
/// Owned by the session; reconciliation, interpolation, and composition all
/// borrow it from the single render-tick thread. Uses BTreeMap so iteration
/// (and therefore draw order within a kind) is deterministic.
#[derive(Debug, Clone)]
pub struct SceneState {
    extent: GridExtent,
    config: SceneConfig,
    kinds: BTreeMap<EntityKind, BTreeMap<EntityId, Entity>>,
    last_seq: BTreeMap<EntityKind, u64>,
}

impl SceneState {
    pub fn new(extent: GridExtent, config: SceneConfig) -> Self {
        let mut kinds = BTreeMap::new();
        for kind in EntityKind::ALL {
            kinds.insert(kind, BTreeMap::new());
        }
        Self {
            extent,
            config,
            kinds,
            last_seq: BTreeMap::new(),
        }
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Adopt the grid size the server reported at init.
    pub fn set_extent(&mut self, extent: GridExtent) {
        self.extent = extent;
    }

    pub fn config(&self) -> SceneConfig {
        self.config
    }

    /// Read-only access to one kind's live entities.
    pub fn entities(&self, kind: EntityKind) -> &BTreeMap<EntityId, Entity> {
        &self.kinds[&kind]
    }

    pub fn get(&self, kind: EntityKind, id: EntityId) -> Option<&Entity> {
        self.kinds[&kind].get(&id)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.kinds[&kind].len()
    }

    pub fn total(&self) -> usize {
        self.kinds.values().map(|m| m.len()).sum()
    }

    /// Number of entities with an interpolation span in flight.
    pub fn in_flight(&self) -> usize {
        self.kinds
            .values()
            .flat_map(|m| m.values())
            .filter(|e| !e.is_settled())
            .count()
    }

    /// Reconcile one kind's live set against a new snapshot.
    ///
    /// Records naming an existing id re-arm its interpolation from the
    /// current rendered position; unseen ids spawn settled; ids absent from
    /// the snapshot are removed. Heading and signal state apply immediately.
    /// Snapshots arriving out of sequence are rejected wholesale.
    pub fn apply_snapshot(&mut self, snap: &KindSnapshot) -> ApplyOutcome {
        let last = self.last_seq.get(&snap.kind).copied().unwrap_or(0);
        if snap.seq <= last {
            tracing::warn!(
                kind = snap.kind.name(),
                seq = snap.seq,
                last_seq = last,
                "discarding out-of-order snapshot"
            );
            return ApplyOutcome::Stale {
                seq: snap.seq,
                last_seq: last,
            };
        }
        self.last_seq.insert(snap.kind, snap.seq);

        let extent = self.extent;
        let interpolate_signals = self.config.interpolate_signals;
        let entities = self.kinds.entry(snap.kind).or_default();

        let mut added = 0;
        let mut updated = 0;
        let mut seen: Vec<EntityId> = Vec::with_capacity(snap.records.len());

        for rec in &snap.records {
            seen.push(rec.id);
            let position = grid_to_world(snap.kind, rec.x, rec.y, rec.z, extent);

            if let Some(entity) = entities.get_mut(&rec.id) {
                update_kind_data(&mut entity.data, rec);
                match snap.kind {
                    EntityKind::Vehicle => entity.begin_span(position),
                    EntityKind::Signal => {
                        if interpolate_signals {
                            entity.begin_span(position);
                        } else {
                            entity.snap_to(position);
                        }
                    }
                    // Static kinds keep the position they were created with.
                    EntityKind::Building | EntityKind::RoadSegment => {}
                }
                updated += 1;
            } else {
                let data = spawn_kind_data(snap.kind, rec);
                entities.insert(rec.id, Entity::spawn(rec.id, position, data));
                added += 1;
            }
        }

        let before = entities.len();
        entities.retain(|id, _| seen.contains(id));
        let removed = before - entities.len();

        tracing::debug!(
            kind = snap.kind.name(),
            seq = snap.seq,
            added,
            updated,
            removed,
            "snapshot reconciled"
        );
        ApplyOutcome::Applied {
            added,
            updated,
            removed,
        }
    }

    /// Advance every progress-bearing entity by `delta_ms`.
    ///
    /// Buildings and road segments have no motion semantics and are skipped
    /// entirely; signals participate only when configured to interpolate.
    pub fn advance(&mut self, delta_ms: f32) {
        let duration = self.config.interpolation_ms;
        let interpolate_signals = self.config.interpolate_signals;
        for (kind, entities) in self.kinds.iter_mut() {
            match kind {
                EntityKind::Vehicle => {
                    for entity in entities.values_mut() {
                        entity.advance(delta_ms, duration);
                    }
                }
                EntityKind::Signal if interpolate_signals => {
                    for entity in entities.values_mut() {
                        entity.advance(delta_ms, duration);
                    }
                }
                EntityKind::Signal | EntityKind::Building | EntityKind::RoadSegment => {}
            }
        }
    }
}

/// Kind data for a newly spawned entity. Missing wire fields fall back to
/// harmless defaults (a signal with no reported state starts red).
fn spawn_kind_data(kind: EntityKind, rec: &SnapshotRecord) -> KindData {
    let heading = rec.heading.unwrap_or(Heading::North);
    match kind {
        EntityKind::Vehicle => KindData::Vehicle { heading },
        EntityKind::Building => KindData::Building,
        EntityKind::Signal => KindData::Signal {
            heading,
            go: rec.go.unwrap_or(false),
        },
        EntityKind::RoadSegment => KindData::RoadSegment { heading },
    }
}

/// Apply the non-interpolated fields of an update in place. Heading and
/// signal state snap instantly; absent fields leave the old value.
fn update_kind_data(data: &mut KindData, rec: &SnapshotRecord) {
    match data {
        KindData::Vehicle { heading } => {
            if let Some(h) = rec.heading {
                *heading = h;
            }
        }
        KindData::Building => {}
        KindData::Signal { heading, go } => {
            if let Some(h) = rec.heading {
                *heading = h;
            }
            if let Some(g) = rec.go {
                *go = g;
            }
        }
        KindData::RoadSegment { heading } => {
            if let Some(h) = rec.heading {
                *heading = h;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn scene() -> SceneState {
        SceneState::new(
            GridExtent {
                width: 28,
                height: 28,
            },
            SceneConfig::default(),
        )
    }

    fn vehicles(seq: u64, records: Vec<SnapshotRecord>) -> KindSnapshot {
        KindSnapshot::new(EntityKind::Vehicle, seq, records)
    }

    #[test]
    fn spawn_renders_at_mapped_position_immediately() {
        let mut s = scene();
        s.apply_snapshot(&vehicles(1, vec![SnapshotRecord::at(7, 2.0, 1.0, 3.0)]));

        let e = s.get(EntityKind::Vehicle, EntityId(7)).unwrap();
        assert!(e.is_settled());
        // (x+0.5, y-0.88, height-z-0.5)
        assert_eq!(e.current, Vec3::new(2.5, 0.12, 24.5));
    }

    #[test]
    fn update_rearms_span_from_rendered_position() {
        let mut s = scene();
        s.apply_snapshot(&vehicles(1, vec![SnapshotRecord::at(7, 2.0, 1.0, 3.0)]));
        s.apply_snapshot(&vehicles(2, vec![SnapshotRecord::at(7, 5.0, 1.0, 3.0)]));
        s.advance(100.0); // halfway through the 200 ms span

        let rendered = s.get(EntityKind::Vehicle, EntityId(7)).unwrap().current;

        // A third snapshot arrives mid-span: the new span must start from
        // the rendered position, not from the second snapshot's target.
        s.apply_snapshot(&vehicles(3, vec![SnapshotRecord::at(7, 5.0, 1.0, 6.0)]));
        let e = s.get(EntityKind::Vehicle, EntityId(7)).unwrap();
        assert_eq!(e.initial, rendered);
        assert_eq!(e.progress, 0.0);
        assert_eq!(e.id, EntityId(7));
        assert_eq!(e.kind(), EntityKind::Vehicle);
    }

    #[test]
    fn omitted_ids_are_removed() {
        let mut s = scene();
        s.apply_snapshot(&vehicles(
            1,
            vec![
                SnapshotRecord::at(12, 1.0, 1.0, 1.0),
                SnapshotRecord::at(13, 2.0, 1.0, 2.0),
            ],
        ));
        assert_eq!(s.count(EntityKind::Vehicle), 2);

        s.apply_snapshot(&vehicles(2, vec![SnapshotRecord::at(13, 2.0, 1.0, 3.0)]));
        assert!(s.get(EntityKind::Vehicle, EntityId(12)).is_none());
        assert_eq!(s.count(EntityKind::Vehicle), 1);
    }

    #[test]
    fn stale_sequence_is_rejected() {
        let mut s = scene();
        s.apply_snapshot(&vehicles(5, vec![SnapshotRecord::at(1, 1.0, 1.0, 1.0)]));

        // A slow in-flight response from an earlier poll lands late.
        let outcome = s.apply_snapshot(&vehicles(3, vec![]));
        assert_eq!(outcome, ApplyOutcome::Stale { seq: 3, last_seq: 5 });
        // The live set is untouched by the stale snapshot.
        assert_eq!(s.count(EntityKind::Vehicle), 1);
    }

    #[test]
    fn signal_state_applies_immediately() {
        let mut s = scene();
        let snap = KindSnapshot::new(
            EntityKind::Signal,
            1,
            vec![SnapshotRecord::at(3, 4.0, 1.0, 4.0)
                .heading(Heading::East)
                .go(false)],
        );
        s.apply_snapshot(&snap);

        let snap = KindSnapshot::new(
            EntityKind::Signal,
            2,
            vec![SnapshotRecord::at(3, 4.0, 1.0, 4.0).go(true)],
        );
        s.apply_snapshot(&snap);

        let e = s.get(EntityKind::Signal, EntityId(3)).unwrap();
        match e.data {
            KindData::Signal { heading, go } => {
                assert!(go);
                assert_eq!(heading, Heading::East); // absent field keeps old value
            }
            _ => panic!("wrong kind data"),
        }
        // Signals snap by default: no span in flight.
        assert!(e.is_settled());
    }

    #[test]
    fn signals_interpolate_when_configured() {
        let mut s = SceneState::new(
            GridExtent::default(),
            SceneConfig {
                interpolate_signals: true,
                ..SceneConfig::default()
            },
        );
        let at = |seq, x| {
            KindSnapshot::new(
                EntityKind::Signal,
                seq,
                vec![SnapshotRecord::at(1, x, 1.0, 0.0).heading(Heading::North)],
            )
        };
        s.apply_snapshot(&at(1, 0.0));
        s.apply_snapshot(&at(2, 4.0));
        let e = s.get(EntityKind::Signal, EntityId(1)).unwrap();
        assert!(!e.is_settled());
    }

    #[test]
    fn static_kinds_never_move() {
        let mut s = scene();
        let snap = |seq, x| {
            KindSnapshot::new(
                EntityKind::Building,
                seq,
                vec![SnapshotRecord::at(9, x, 1.0, 5.0)],
            )
        };
        s.apply_snapshot(&snap(1, 2.0));
        let spawned = s.get(EntityKind::Building, EntityId(9)).unwrap().current;

        s.apply_snapshot(&snap(2, 10.0));
        s.advance(500.0);
        let e = s.get(EntityKind::Building, EntityId(9)).unwrap();
        assert_eq!(e.current, spawned);
        assert!(e.is_settled());
    }

    #[test]
    fn advance_settles_all_vehicles() {
        let mut s = scene();
        s.apply_snapshot(&vehicles(
            1,
            vec![
                SnapshotRecord::at(1, 0.0, 1.0, 0.0),
                SnapshotRecord::at(2, 5.0, 1.0, 5.0),
            ],
        ));
        s.apply_snapshot(&vehicles(
            2,
            vec![
                SnapshotRecord::at(1, 1.0, 1.0, 0.0),
                SnapshotRecord::at(2, 5.0, 1.0, 6.0),
            ],
        ));
        assert_eq!(s.in_flight(), 2);

        // Interpolation duration is 200 ms; give it more than enough.
        for _ in 0..20 {
            s.advance(16.0);
        }
        assert_eq!(s.in_flight(), 0);
        for e in s.entities(EntityKind::Vehicle).values() {
            assert_eq!(e.current, e.target);
        }
    }

    #[test]
    fn deterministic_given_identical_deltas() {
        let run = || {
            let mut s = scene();
            s.apply_snapshot(&vehicles(1, vec![SnapshotRecord::at(1, 0.0, 1.0, 0.0)]));
            s.apply_snapshot(&vehicles(2, vec![SnapshotRecord::at(1, 7.0, 1.0, 2.0)]));
            let mut positions = Vec::new();
            for _ in 0..12 {
                s.advance(17.0);
                positions.push(s.get(EntityKind::Vehicle, EntityId(1)).unwrap().current);
            }
            positions
        };
        assert_eq!(run(), run());
    }
}
