use cityview_common::EntityKind;
use cityview_scene::{Entity, KindData, SceneState};
use glam::{Mat4, Quat};

/// Per-draw material parameters handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub color: [f32; 4],
    pub emissive: [f32; 4],
}

/// One render-ready entity: mesh selection key, world transform, material.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub kind: EntityKind,
    pub model: Mat4,
    pub material: MaterialParams,
}

/// Scene lighting, edited live by the parameter panel. Purely visual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSettings {
    pub light_position: [f32; 3],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            light_position: [0.0, 30.0, 0.0],
            ambient: [0.5, 0.5, 0.5, 1.0],
            diffuse: [0.5, 0.5, 0.5, 1.0],
            specular: [0.5, 0.5, 0.5, 1.0],
            shininess: 60.0,
        }
    }
}

const NO_EMISSION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const SIGNAL_GO: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const SIGNAL_STOP: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Build the frame's draw list from the current scene.
///
/// Kinds are emitted in `EntityKind::ALL` order (static geometry first) so
/// the backend can batch per-kind draws. Road segments are excluded; their
/// geometry is baked once into static meshes, not drawn per entity.
pub fn compose(scene: &SceneState) -> Vec<DrawItem> {
    let mut items = Vec::with_capacity(scene.total());
    for kind in EntityKind::ALL {
        if kind == EntityKind::RoadSegment {
            continue;
        }
        for entity in scene.entities(kind).values() {
            items.push(compose_entity(entity));
        }
    }
    items
}

fn compose_entity(entity: &Entity) -> DrawItem {
    let yaw = match entity.data {
        KindData::Vehicle { heading } => heading.yaw(),
        KindData::Building => 0.0,
        // Signal heads face the traffic they control.
        KindData::Signal { heading, .. } => heading.opposite().yaw(),
        KindData::RoadSegment { heading } => heading.yaw(),
    };
    let model = Mat4::from_scale_rotation_translation(
        entity.scale,
        Quat::from_rotation_y(yaw),
        entity.current,
    );

    let material = match entity.data {
        KindData::Signal { go, .. } => {
            let body = if go { SIGNAL_GO } else { SIGNAL_STOP };
            MaterialParams {
                color: body,
                emissive: body,
            }
        }
        KindData::Vehicle { .. } | KindData::Building | KindData::RoadSegment { .. } => {
            MaterialParams {
                color: entity.color,
                emissive: NO_EMISSION,
            }
        }
    };

    DrawItem {
        kind: entity.kind(),
        model,
        material,
    }
}
