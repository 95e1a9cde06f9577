use cityview_common::{EntityId, EntityKind, Heading};
use glam::Vec3;

/// Body colors cycled through for vehicles, keyed by id so a vehicle keeps
/// its color across snapshots and reconnects.
const VEHICLE_PALETTE: [[f32; 4]; 8] = [
    [0.85, 0.15, 0.15, 1.0],
    [0.15, 0.35, 0.85, 1.0],
    [0.90, 0.75, 0.10, 1.0],
    [0.15, 0.70, 0.30, 1.0],
    [0.80, 0.40, 0.10, 1.0],
    [0.55, 0.20, 0.75, 1.0],
    [0.10, 0.70, 0.75, 1.0],
    [0.90, 0.90, 0.90, 1.0],
];

/// Kind-specific entity data. The discriminant is fixed for the entity's
/// lifetime; reconciliation and composition match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindData {
    Vehicle { heading: Heading },
    Building,
    Signal { heading: Heading, go: bool },
    RoadSegment { heading: Heading },
}

impl KindData {
    pub fn kind(&self) -> EntityKind {
        match self {
            KindData::Vehicle { .. } => EntityKind::Vehicle,
            KindData::Building => EntityKind::Building,
            KindData::Signal { .. } => EntityKind::Signal,
            KindData::RoadSegment { .. } => EntityKind::RoadSegment,
        }
    }
}

/// One simulated object as rendered by the client.
///
/// `current` is the rendered position. While an interpolation span is
/// active, `initial` and `target` bound it and `progress` walks from 0 to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub current: Vec3,
    pub initial: Vec3,
    pub target: Vec3,
    /// In [0, 1]; 1 means settled at `target`.
    pub progress: f32,
    /// Time since the current interpolation span began, in milliseconds.
    pub elapsed_ms: f32,
    pub scale: Vec3,
    pub color: [f32; 4],
    pub data: KindData,
}

impl Entity {
    /// Spawn an entity settled at `position` — it renders at its spawn
    /// location immediately, with no initial glide.
    pub fn spawn(id: EntityId, position: Vec3, data: KindData) -> Self {
        let (scale, color) = match data {
            KindData::Vehicle { .. } => (
                Vec3::splat(0.5),
                VEHICLE_PALETTE[(id.0 as usize) % VEHICLE_PALETTE.len()],
            ),
            KindData::Building => (Vec3::ONE, [0.8, 0.8, 0.8, 1.0]),
            KindData::Signal { .. } => (Vec3::splat(0.2), [0.2, 0.2, 0.2, 1.0]),
            KindData::RoadSegment { .. } => (Vec3::ONE, [0.2, 0.2, 0.2, 1.0]),
        };
        Self {
            id,
            current: position,
            initial: position,
            target: position,
            progress: 1.0,
            elapsed_ms: 0.0,
            scale,
            color,
            data,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }

    pub fn heading(&self) -> Option<Heading> {
        match self.data {
            KindData::Vehicle { heading } => Some(heading),
            KindData::Building => None,
            KindData::Signal { heading, .. } => Some(heading),
            KindData::RoadSegment { heading } => Some(heading),
        }
    }

    /// Settled means no interpolation span is in flight.
    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }

    /// Arm a new interpolation span toward `target`, starting from the
    /// current rendered position (not the previous target) so irregular
    /// snapshot timing never causes a positional snap.
    pub fn begin_span(&mut self, target: Vec3) {
        self.initial = self.current;
        self.target = target;
        self.elapsed_ms = 0.0;
        self.progress = 0.0;
    }

    /// Place the entity at `position` immediately, ending any span.
    pub fn snap_to(&mut self, position: Vec3) {
        self.current = position;
        self.initial = position;
        self.target = position;
        self.elapsed_ms = 0.0;
        self.progress = 1.0;
    }

    /// Advance the active interpolation span by `delta_ms`.
    ///
    /// Settled entities are clamped to their target every call, which also
    /// guards against floating-point drift after a span completes.
    pub fn advance(&mut self, delta_ms: f32, duration_ms: f32) {
        if self.progress >= 1.0 {
            self.current = self.target;
            return;
        }
        self.elapsed_ms += delta_ms;
        self.progress = (self.elapsed_ms / duration_ms).min(1.0);
        if self.progress >= 1.0 {
            self.current = self.target;
        } else {
            self.current = self.initial.lerp(self.target, self.progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: u64, pos: Vec3) -> Entity {
        Entity::spawn(
            EntityId(id),
            pos,
            KindData::Vehicle {
                heading: Heading::North,
            },
        )
    }

    #[test]
    fn spawn_is_settled_at_position() {
        let e = vehicle(1, Vec3::new(2.0, 0.0, 3.0));
        assert!(e.is_settled());
        assert_eq!(e.current, Vec3::new(2.0, 0.0, 3.0));
        assert_eq!(e.current, e.target);
        assert_eq!(e.current, e.initial);
    }

    #[test]
    fn span_midpoint_and_exact_arrival() {
        // Entity at (2,0,3) receives target (5,0,3) with a 200 ms span.
        let mut e = vehicle(7, Vec3::new(2.0, 0.0, 3.0));
        e.begin_span(Vec3::new(5.0, 0.0, 3.0));

        e.advance(100.0, 200.0);
        assert!((e.progress - 0.5).abs() < f32::EPSILON);
        assert!((e.current - Vec3::new(3.5, 0.0, 3.0)).length() < 1e-5);

        e.advance(150.0, 200.0);
        assert_eq!(e.progress, 1.0);
        assert_eq!(e.current, Vec3::new(5.0, 0.0, 3.0)); // exact, not approximate
    }

    #[test]
    fn advance_zero_delta_never_moves() {
        let mut e = vehicle(2, Vec3::ZERO);
        e.begin_span(Vec3::new(4.0, 0.0, 0.0));
        e.advance(50.0, 200.0);
        let mid = e.current;
        e.advance(0.0, 200.0);
        assert_eq!(e.current, mid);

        // Also idempotent once settled.
        e.advance(1000.0, 200.0);
        let done = e.current;
        e.advance(0.0, 200.0);
        assert_eq!(e.current, done);
    }

    #[test]
    fn progress_is_monotone_and_clamped() {
        let mut e = vehicle(3, Vec3::ZERO);
        e.begin_span(Vec3::new(1.0, 0.0, 0.0));
        let mut last = e.progress;
        for _ in 0..20 {
            e.advance(25.0, 200.0);
            assert!(e.progress >= last);
            assert!((0.0..=1.0).contains(&e.progress));
            last = e.progress;
        }
        assert_eq!(e.progress, 1.0);
        assert_eq!(e.current, e.target);
    }

    #[test]
    fn restart_from_rendered_position() {
        let mut e = vehicle(4, Vec3::ZERO);
        e.begin_span(Vec3::new(10.0, 0.0, 0.0));
        e.advance(60.0, 200.0);
        let rendered = e.current;
        assert_ne!(rendered, e.target);

        e.begin_span(Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(e.initial, rendered);
        assert_eq!(e.progress, 0.0);
    }

    #[test]
    fn settled_clamp_pins_to_target() {
        let mut e = vehicle(5, Vec3::ZERO);
        e.begin_span(Vec3::new(1.0, 2.0, 3.0));
        e.advance(500.0, 200.0);
        // Perturb `current` the way accumulated float error might.
        e.current.x += 1e-6;
        e.advance(16.0, 200.0);
        assert_eq!(e.current, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn vehicle_color_is_stable_per_id() {
        let a = vehicle(9, Vec3::ZERO);
        let b = vehicle(9, Vec3::ONE);
        assert_eq!(a.color, b.color);
    }

    #[test]
    fn snap_to_ends_span() {
        let mut e = Entity::spawn(
            EntityId(1),
            Vec3::ZERO,
            KindData::Signal {
                heading: Heading::East,
                go: false,
            },
        );
        e.begin_span(Vec3::new(3.0, 0.0, 0.0));
        e.snap_to(Vec3::new(7.0, 0.0, 0.0));
        assert!(e.is_settled());
        assert_eq!(e.current, Vec3::new(7.0, 0.0, 0.0));
    }
}
