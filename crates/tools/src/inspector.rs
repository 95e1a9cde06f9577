use cityview_common::{EntityId, EntityKind};
use cityview_scene::SceneState;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the live scene for the UI panel, the
/// CLI, and tests.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &SceneState) -> SceneSummary {
        SceneSummary {
            grid: (scene.extent().width, scene.extent().height),
            vehicles: scene.count(EntityKind::Vehicle),
            buildings: scene.count(EntityKind::Building),
            signals: scene.count(EntityKind::Signal),
            roads: scene.count(EntityKind::RoadSegment),
            in_flight: scene.in_flight(),
        }
    }

    /// Get one entity's render state as a formatted record.
    pub fn inspect_entity(scene: &SceneState, kind: EntityKind, id: EntityId) -> Option<EntityInfo> {
        scene.get(kind, id).map(|e| EntityInfo {
            id,
            kind,
            position: [e.current.x, e.current.y, e.current.z],
            target: [e.target.x, e.target.y, e.target.z],
            progress: e.progress,
        })
    }

    /// List the live ids of one kind.
    pub fn list_entities(scene: &SceneState, kind: EntityKind) -> Vec<EntityId> {
        scene.entities(kind).keys().copied().collect()
    }
}

/// Per-kind counts plus interpolation activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSummary {
    pub grid: (u32, u32),
    pub vehicles: usize,
    pub buildings: usize,
    pub signals: usize,
    pub roads: usize,
    pub in_flight: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: grid={}x{} vehicles={} buildings={} signals={} roads={} in_flight={}",
            self.grid.0,
            self.grid.1,
            self.vehicles,
            self.buildings,
            self.signals,
            self.roads,
            self.in_flight
        )
    }
}

/// Render state of a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub progress: f32,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] pos=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) progress={:.2}",
            self.kind.name(),
            self.id,
            self.position[0],
            self.position[1],
            self.position[2],
            self.target[0],
            self.target[1],
            self.target[2],
            self.progress,
        )
    }
}
