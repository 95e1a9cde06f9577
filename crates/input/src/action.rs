use crate::held::{HeldKeys, Key};

/// A unit camera adjustment for one frame. The camera scales these by its
/// configured speeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Azimuth/elevation deltas in unit steps.
    Rotate { d_azimuth: f32, d_elevation: f32 },
    /// Strafe/lift pan in unit steps.
    Pan { dx: f32, dy: f32 },
    /// Pan along the ground in the view direction.
    PanForward(f32),
    /// Positive moves away from the focus.
    Zoom(f32),
}

/// Derive this frame's camera commands from the held-key set.
///
/// Arrows orbit, WASD pans, the zoom keys dolly. Opposing keys held
/// together cancel out key by key, matching what each command contributes.
pub fn commands(held: &HeldKeys) -> Vec<CameraCommand> {
    let mut out = Vec::new();

    let mut d_azimuth = 0.0;
    let mut d_elevation = 0.0;
    if held.is_held(Key::ArrowLeft) {
        d_azimuth -= 1.0;
    }
    if held.is_held(Key::ArrowRight) {
        d_azimuth += 1.0;
    }
    if held.is_held(Key::ArrowUp) {
        d_elevation += 1.0;
    }
    if held.is_held(Key::ArrowDown) {
        d_elevation -= 1.0;
    }
    if d_azimuth != 0.0 || d_elevation != 0.0 {
        out.push(CameraCommand::Rotate {
            d_azimuth,
            d_elevation,
        });
    }

    let mut dx = 0.0;
    if held.is_held(Key::A) {
        dx -= 1.0;
    }
    if held.is_held(Key::D) {
        dx += 1.0;
    }
    if dx != 0.0 {
        out.push(CameraCommand::Pan { dx, dy: 0.0 });
    }

    let mut forward = 0.0;
    if held.is_held(Key::W) {
        forward += 1.0;
    }
    if held.is_held(Key::S) {
        forward -= 1.0;
    }
    if forward != 0.0 {
        out.push(CameraCommand::PanForward(forward));
    }

    let mut zoom = 0.0;
    if held.is_held(Key::ZoomIn) {
        zoom -= 1.0;
    }
    if held.is_held(Key::ZoomOut) {
        zoom += 1.0;
    }
    if zoom != 0.0 {
        out.push(CameraCommand::Zoom(zoom));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keys_no_commands() {
        assert!(commands(&HeldKeys::new()).is_empty());
    }

    #[test]
    fn held_arrow_rotates_every_frame() {
        let mut keys = HeldKeys::new();
        keys.press(Key::ArrowLeft);
        for _ in 0..3 {
            let cmds = commands(&keys);
            assert_eq!(
                cmds,
                vec![CameraCommand::Rotate {
                    d_azimuth: -1.0,
                    d_elevation: 0.0
                }]
            );
        }
    }

    #[test]
    fn diagonal_rotation_combines_axes() {
        let mut keys = HeldKeys::new();
        keys.press(Key::ArrowRight);
        keys.press(Key::ArrowUp);
        assert_eq!(
            commands(&keys),
            vec![CameraCommand::Rotate {
                d_azimuth: 1.0,
                d_elevation: 1.0
            }]
        );
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut keys = HeldKeys::new();
        keys.press(Key::A);
        keys.press(Key::D);
        keys.press(Key::ZoomIn);
        keys.press(Key::ZoomOut);
        assert!(commands(&keys).is_empty());
    }

    #[test]
    fn pan_and_zoom_coexist() {
        let mut keys = HeldKeys::new();
        keys.press(Key::W);
        keys.press(Key::ZoomIn);
        let cmds = commands(&keys);
        assert!(cmds.contains(&CameraCommand::PanForward(1.0)));
        assert!(cmds.contains(&CameraCommand::Zoom(-1.0)));
    }
}
