use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unique identifier for a simulated entity, assigned by the server.
///
/// Ids are unique within a kind and stable for as long as the object
/// persists on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a simulated entity. Fixed for the entity's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Vehicle,
    Building,
    Signal,
    RoadSegment,
}

impl EntityKind {
    /// All kinds, in composition order (static geometry first).
    pub const ALL: [EntityKind; 4] = [
        EntityKind::RoadSegment,
        EntityKind::Building,
        EntityKind::Signal,
        EntityKind::Vehicle,
    ];

    /// Whether entities of this kind move and carry interpolation state.
    pub fn is_mobile(self) -> bool {
        matches!(self, EntityKind::Vehicle | EntityKind::Signal)
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Vehicle => "vehicle",
            EntityKind::Building => "building",
            EntityKind::Signal => "signal",
            EntityKind::RoadSegment => "road",
        }
    }
}

/// A discrete heading on the grid.
///
/// The server speaks in screen terms (up/down/left/right); we keep compass
/// names and map to a yaw angle at composition time. Headings are never
/// interpolated; they snap on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    /// Decode a wire direction string, case-insensitively.
    pub fn from_wire(s: &str) -> Option<Heading> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "north" => Some(Heading::North),
            "down" | "south" => Some(Heading::South),
            "right" | "east" => Some(Heading::East),
            "left" | "west" => Some(Heading::West),
            _ => None,
        }
    }

    /// Yaw rotation (radians about +Y) applied to a mesh facing north.
    pub fn yaw(self) -> f32 {
        match self {
            Heading::North => 0.0,
            Heading::South => std::f32::consts::PI,
            Heading::East => -std::f32::consts::FRAC_PI_2,
            Heading::West => std::f32::consts::FRAC_PI_2,
        }
    }

    pub fn opposite(self) -> Heading {
        match self {
            Heading::North => Heading::South,
            Heading::South => Heading::North,
            Heading::East => Heading::West,
            Heading::West => Heading::East,
        }
    }
}

/// Dimensions of the simulated grid, reported by the server at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridExtent {
    pub width: u32,
    pub height: u32,
}

impl GridExtent {
    /// Horizontal center of the world, the default camera look-at point.
    pub fn center(self) -> Vec3 {
        Vec3::new(self.width as f32 / 2.0, 0.0, self.height as f32 / 2.0)
    }
}

impl Default for GridExtent {
    fn default() -> Self {
        Self {
            width: 28,
            height: 28,
        }
    }
}

/// Map a server grid cell to a world-space position.
///
/// Server +y on the grid runs away from the viewer while world +z runs
/// toward it, so the depth axis is flipped against the grid height. Each
/// kind carries a fixed offset that centers (or grounds) its mesh in the
/// cell. Spawn and update paths must both go through this function.
pub fn grid_to_world(kind: EntityKind, x: f32, y: f32, z: f32, extent: GridExtent) -> Vec3 {
    let h = extent.height as f32;
    match kind {
        EntityKind::Vehicle => Vec3::new(x + 0.5, y - 0.88, h - z - 0.5),
        EntityKind::Building => Vec3::new(x + 0.5, y - 1.0, h - z - 0.5),
        EntityKind::Signal => Vec3::new(x + 0.5, y - 0.5, h - z - 0.5),
        EntityKind::RoadSegment => Vec3::new(x, y - 1.0, h - z - 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_wire_decode_is_case_insensitive() {
        assert_eq!(Heading::from_wire("Up"), Some(Heading::North));
        assert_eq!(Heading::from_wire("DOWN"), Some(Heading::South));
        assert_eq!(Heading::from_wire("right"), Some(Heading::East));
        assert_eq!(Heading::from_wire("Left"), Some(Heading::West));
        assert_eq!(Heading::from_wire("diagonal"), None);
    }

    #[test]
    fn heading_yaw_covers_quarter_turns() {
        assert_eq!(Heading::North.yaw(), 0.0);
        assert_eq!(Heading::South.yaw(), std::f32::consts::PI);
        assert_eq!(Heading::East.yaw(), -std::f32::consts::FRAC_PI_2);
        assert_eq!(Heading::West.yaw(), std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn heading_opposite_is_involutive() {
        for h in [Heading::North, Heading::South, Heading::East, Heading::West] {
            assert_eq!(h.opposite().opposite(), h);
        }
    }

    #[test]
    fn depth_axis_is_flipped() {
        let extent = GridExtent {
            width: 28,
            height: 28,
        };
        let near = grid_to_world(EntityKind::Vehicle, 0.0, 1.0, 0.0, extent);
        let far = grid_to_world(EntityKind::Vehicle, 0.0, 1.0, 27.0, extent);
        assert!(near.z > far.z);
        assert_eq!(near.z, 27.5);
        assert_eq!(far.z, 0.5);
    }

    #[test]
    fn mapping_is_identical_for_equal_inputs() {
        let extent = GridExtent::default();
        let a = grid_to_world(EntityKind::Signal, 3.0, 1.0, 4.0, extent);
        let b = grid_to_world(EntityKind::Signal, 3.0, 1.0, 4.0, extent);
        assert_eq!(a, b);
    }

    #[test]
    fn road_cells_sit_on_the_ground() {
        let extent = GridExtent::default();
        let p = grid_to_world(EntityKind::RoadSegment, 5.0, 1.0, 5.0, extent);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn extent_center_is_horizontal() {
        let extent = GridExtent {
            width: 30,
            height: 20,
        };
        assert_eq!(extent.center(), Vec3::new(15.0, 0.0, 10.0));
    }

    #[test]
    fn mobile_kinds() {
        assert!(EntityKind::Vehicle.is_mobile());
        assert!(EntityKind::Signal.is_mobile());
        assert!(!EntityKind::Building.is_mobile());
        assert!(!EntityKind::RoadSegment.is_mobile());
    }
}
