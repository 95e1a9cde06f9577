use cityview_common::{EntityKind, GridExtent, Heading};
use cityview_scene::{KindData, SceneState};

/// Heights for the stacked flat layers, in world units. Lane markings sit
/// above the road surface, which sits above the ground plane, so the depth
/// test keeps them visible without polygon-offset tricks.
const GROUND_Y: f32 = 0.0;
const ROAD_Y: f32 = 0.005;
const LANE_Y: f32 = 0.01;

const LANE_OFFSET: f32 = 0.01;
const LANE_WIDTH: f32 = 0.05;

/// An upward-facing triangle soup, built once from static scene content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl FlatGeometry {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Append an axis-aligned horizontal quad spanning `[x0, x1] x [z0, z1]`.
    fn push_quad(&mut self, x0: f32, x1: f32, z0: f32, z1: f32, y: f32) {
        let base = self.positions.len() as u32;
        self.positions.extend([
            [x0, y, z0],
            [x1, y, z0],
            [x1, y, z1],
            [x0, y, z1],
        ]);
        self.normals.extend([[0.0, 1.0, 0.0]; 4]);
        self.indices
            .extend([base, base + 2, base + 1, base, base + 3, base + 2]);
    }
}

/// One quad covering the whole grid footprint at ground level.
pub fn ground_plane(extent: GridExtent) -> FlatGeometry {
    let mut geo = FlatGeometry::default();
    geo.push_quad(
        0.0,
        extent.width as f32,
        0.0,
        extent.height as f32,
        GROUND_Y,
    );
    geo
}

/// One quad per road cell, flush with the ground.
///
/// Road entities carry the south-west corner of their cell, so each quad
/// spans one unit in +x and +z from the entity's rendered position.
pub fn road_surface(scene: &SceneState) -> FlatGeometry {
    let mut geo = FlatGeometry::default();
    for entity in scene.entities(EntityKind::RoadSegment).values() {
        let x = entity.current.x;
        let z = entity.current.z;
        geo.push_quad(x, x + 1.0, z, z + 1.0, ROAD_Y);
    }
    geo
}

/// Thin edge strips along each road cell, oriented by traffic direction.
///
/// North/south roads get strips along their left and right edges (running
/// in z); east/west roads get strips along their top and bottom edges
/// (running in x).
pub fn lane_markings(scene: &SceneState) -> FlatGeometry {
    let mut geo = FlatGeometry::default();
    for entity in scene.entities(EntityKind::RoadSegment).values() {
        let heading = match entity.data {
            KindData::RoadSegment { heading } => heading,
            _ => continue,
        };
        let x = entity.current.x;
        let z = entity.current.z;
        let near = LANE_OFFSET;
        let far = 1.0 - LANE_OFFSET - LANE_WIDTH;
        match heading {
            Heading::North | Heading::South => {
                geo.push_quad(x + near, x + near + LANE_WIDTH, z, z + 1.0, LANE_Y);
                geo.push_quad(x + far, x + far + LANE_WIDTH, z, z + 1.0, LANE_Y);
            }
            Heading::East | Heading::West => {
                geo.push_quad(x, x + 1.0, z + near, z + near + LANE_WIDTH, LANE_Y);
                geo.push_quad(x, x + 1.0, z + far, z + far + LANE_WIDTH, LANE_Y);
            }
        }
    }
    geo
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityview_scene::{KindSnapshot, SceneConfig, SnapshotRecord};

    fn scene_with_roads(records: Vec<SnapshotRecord>) -> SceneState {
        let mut s = SceneState::new(GridExtent::default(), SceneConfig::default());
        s.apply_snapshot(&KindSnapshot::new(EntityKind::RoadSegment, 1, records));
        s
    }

    #[test]
    fn ground_plane_spans_the_extent() {
        let geo = ground_plane(GridExtent {
            width: 30,
            height: 20,
        });
        assert_eq!(geo.quad_count(), 1);
        assert_eq!(geo.positions[2], [30.0, 0.0, 20.0]);
        assert_eq!(geo.indices.len(), 6);
    }

    #[test]
    fn one_surface_quad_per_road_cell() {
        let s = scene_with_roads(vec![
            SnapshotRecord::at(1, 0.0, 1.0, 0.0).heading(Heading::North),
            SnapshotRecord::at(2, 0.0, 1.0, 1.0).heading(Heading::North),
            SnapshotRecord::at(3, 1.0, 1.0, 0.0).heading(Heading::East),
        ]);
        let geo = road_surface(&s);
        assert_eq!(geo.quad_count(), 3);
    }

    #[test]
    fn surface_quad_spans_one_cell() {
        let s = scene_with_roads(vec![SnapshotRecord::at(1, 4.0, 1.0, 4.0).heading(Heading::North)]);
        let geo = road_surface(&s);
        // Cell corner mapping flips depth: z = height - grid_z - 1 = 23.
        assert_eq!(geo.positions[0], [4.0, ROAD_Y, 23.0]);
        assert_eq!(geo.positions[2], [5.0, ROAD_Y, 24.0]);
    }

    #[test]
    fn lane_strips_follow_traffic_orientation() {
        let s = scene_with_roads(vec![
            SnapshotRecord::at(1, 0.0, 1.0, 0.0).heading(Heading::North),
            SnapshotRecord::at(2, 1.0, 1.0, 0.0).heading(Heading::East),
        ]);
        let geo = lane_markings(&s);
        assert_eq!(geo.quad_count(), 4);

        // First road is north-bound: its strips are narrow in x, full in z.
        let strip = &geo.positions[0..4];
        let dx = strip[1][0] - strip[0][0];
        let dz = strip[3][2] - strip[0][2];
        assert!((dx - LANE_WIDTH).abs() < 1e-6);
        assert!((dz - 1.0).abs() < 1e-6);

        // Third quad belongs to the east-bound road: full in x, narrow in z.
        let strip = &geo.positions[8..12];
        let dx = strip[1][0] - strip[0][0];
        let dz = strip[3][2] - strip[0][2];
        assert!((dx - 1.0).abs() < 1e-6);
        assert!((dz - LANE_WIDTH).abs() < 1e-6);
    }

    #[test]
    fn markings_float_above_the_surface() {
        let s = scene_with_roads(vec![SnapshotRecord::at(1, 0.0, 1.0, 0.0).heading(Heading::North)]);
        for p in &lane_markings(&s).positions {
            assert!(p[1] > ROAD_Y);
        }
    }

    #[test]
    fn empty_scene_builds_empty_road_geometry() {
        let s = SceneState::new(GridExtent::default(), SceneConfig::default());
        assert!(road_surface(&s).is_empty());
        assert!(lane_markings(&s).is_empty());
    }
}
