use cityview_common::{CameraTuning, GridExtent};
use glam::{Mat4, Vec3};

/// Orbit camera: a spherical offset around a pannable look-at point.
///
/// Rotation and zoom adjust the spherical coordinates; panning moves a
/// separate offset applied to both eye and target, so orbiting keeps working
/// after a pan. Camera motion is view-only and never touches scene state.
pub struct OrbitCamera {
    /// Base look-at point, the grid's horizontal center.
    pub target: Vec3,
    /// Accumulated pan, applied to both eye and target.
    pub pan_offset: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub tuning: CameraTuning,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// Keep the elevation strictly off the poles so the view basis stays stable.
const ELEVATION_MARGIN: f32 = 0.1;

impl OrbitCamera {
    pub fn new(extent: GridExtent, tuning: CameraTuning) -> Self {
        Self {
            target: extent.center(),
            pan_offset: Vec3::ZERO,
            distance: tuning.initial_distance,
            azimuth: 0.0,
            elevation: tuning.initial_elevation,
            tuning,
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 500.0,
        }
    }

    /// Rotate by held-key deltas (unit steps per frame, scaled by tuning).
    pub fn rotate(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth += d_azimuth * self.tuning.rotation_speed;
        self.elevation = (self.elevation + d_elevation * self.tuning.rotation_speed).clamp(
            -std::f32::consts::FRAC_PI_2 + ELEVATION_MARGIN,
            std::f32::consts::FRAC_PI_2 - ELEVATION_MARGIN,
        );
    }

    /// Pan in the azimuth-only ground basis.
    ///
    /// `dx` strafes, `dy` lifts. The basis ignores elevation so panning
    /// never drives the focus into the ground while looking down.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let front = Vec3::new(self.azimuth.sin(), 0.0, self.azimuth.cos());
        let right = Vec3::new(front.z, 0.0, -front.x);
        self.pan_offset += (-right * dx + Vec3::Y * dy) * self.tuning.pan_speed;
    }

    /// Pan along the ground toward or away from the view direction.
    pub fn pan_forward(&mut self, amount: f32) {
        let front = Vec3::new(self.azimuth.sin(), 0.0, self.azimuth.cos());
        self.pan_offset += -front * amount * self.tuning.pan_speed;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta * self.tuning.zoom_speed)
            .clamp(self.tuning.min_distance, self.tuning.max_distance);
    }

    /// The point the camera looks at, pan included.
    pub fn focus(&self) -> Vec3 {
        self.target + self.pan_offset
    }

    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );
        self.focus() + offset
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.focus(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(GridExtent::default(), CameraTuning::default())
    }

    #[test]
    fn starts_looking_at_the_grid_center() {
        let cam = camera();
        assert_eq!(cam.focus(), Vec3::new(14.0, 0.0, 14.0));
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn elevation_never_reaches_the_poles() {
        let mut cam = camera();
        for _ in 0..10_000 {
            cam.rotate(0.0, 1.0);
        }
        assert!(cam.elevation < std::f32::consts::FRAC_PI_2);
        for _ in 0..20_000 {
            cam.rotate(0.0, -1.0);
        }
        assert!(cam.elevation > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn distance_stays_within_bounds() {
        let mut cam = camera();
        for _ in 0..1_000 {
            cam.zoom(1.0);
        }
        assert_eq!(cam.distance, cam.tuning.max_distance);
        for _ in 0..1_000 {
            cam.zoom(-1.0);
        }
        assert_eq!(cam.distance, cam.tuning.min_distance);
    }

    #[test]
    fn pan_moves_eye_and_focus_together() {
        let mut cam = camera();
        let span = cam.eye() - cam.focus();
        cam.pan(3.0, 0.0);
        cam.pan_forward(2.0);
        assert!((cam.eye() - cam.focus() - span).length() < 1e-5);
        assert_ne!(cam.pan_offset, Vec3::ZERO);
    }

    #[test]
    fn pan_basis_ignores_elevation() {
        let mut cam = camera();
        cam.rotate(0.0, 10.0); // steep look-down
        cam.pan_forward(5.0);
        // Forward pan at any elevation stays on the ground plane.
        assert_eq!(cam.pan_offset.y, 0.0);
    }

    #[test]
    fn eye_distance_matches_spherical_radius() {
        let mut cam = camera();
        cam.rotate(7.0, -3.0);
        cam.zoom(4.0);
        let radius = (cam.eye() - cam.focus()).length();
        assert!((radius - cam.distance).abs() < 1e-3);
    }
}
