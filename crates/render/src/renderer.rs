use cityview_common::EntityKind;
use cityview_scene::SceneState;
use glam::Vec3;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 40.0, 40.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view configuration, then produces
/// output. It never mutates the scene — reconciliation owns scene truth.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene state and view.
    fn render(&self, scene: &SceneState, view: &RenderView) -> Self::Output;
}

/// Debug text renderer — no GPU required.
///
/// Produces a human-readable string representation of the scene state.
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneState, view: &RenderView) -> String {
        let extent = scene.extent();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene ({}x{} grid, {} entities, {} in flight) ===\n",
            extent.width,
            extent.height,
            scene.total(),
            scene.in_flight()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        for kind in EntityKind::ALL {
            let entities = scene.entities(kind);
            if entities.is_empty() {
                continue;
            }
            out.push_str(&format!("{}: {}\n", kind.name(), entities.len()));
            // Static sets are large and uninteresting; list mobile ones only.
            if !kind.is_mobile() {
                continue;
            }
            for (id, e) in entities {
                let p = e.current;
                out.push_str(&format!(
                    "  [{}] pos=({:.2}, {:.2}, {:.2}) progress={:.2}\n",
                    id, p.x, p.y, p.z, e.progress
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityview_common::GridExtent;
    use cityview_scene::{KindSnapshot, SceneConfig, SnapshotRecord};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneState::new(GridExtent::default(), SceneConfig::default());
        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("28x28 grid"));
        assert!(output.contains("0 entities"));
    }

    #[test]
    fn debug_renderer_lists_mobile_entities() {
        let mut scene = SceneState::new(GridExtent::default(), SceneConfig::default());
        scene.apply_snapshot(&KindSnapshot::new(
            EntityKind::Vehicle,
            1,
            vec![
                SnapshotRecord::at(4, 1.0, 1.0, 1.0),
                SnapshotRecord::at(9, 2.0, 1.0, 2.0),
            ],
        ));
        scene.apply_snapshot(&KindSnapshot::new(
            EntityKind::Building,
            1,
            vec![SnapshotRecord::at(1, 5.0, 1.0, 5.0)],
        ));

        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("vehicle: 2"));
        assert!(output.contains("building: 1"));
        assert!(output.contains("[4] pos="));
        // Buildings are counted but not itemized.
        assert!(!output.contains("[1] pos="));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 45.0);
        assert_eq!(view.target, Vec3::ZERO);
    }
}
