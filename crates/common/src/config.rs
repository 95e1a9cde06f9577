use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a viewer configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Camera tuning parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub rotation_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub initial_distance: f32,
    pub initial_elevation: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            rotation_speed: 0.02,
            pan_speed: 0.5,
            zoom_speed: 2.0,
            min_distance: 10.0,
            max_distance: 200.0,
            initial_distance: 50.0,
            initial_elevation: std::f32::consts::FRAC_PI_4,
        }
    }
}

/// Top-level viewer configuration.
///
/// Loaded from a YAML file when present; every field has a default so a
/// missing or partial file still yields a working viewer. CLI flags override
/// individual fields after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL of the simulation server.
    pub server_url: String,
    /// Number of agents requested at init.
    pub agents: u32,
    /// Requested grid size; the server may answer with a different one.
    pub grid_width: u32,
    pub grid_height: u32,
    /// A snapshot poll is requested every this many rendered frames.
    pub poll_every_frames: u32,
    /// Duration of one interpolation span, in milliseconds. Must exceed the
    /// expected inter-snapshot interval or motion stutters.
    pub interpolation_ms: f32,
    /// Upper bound on a single frame delta, in milliseconds.
    pub max_delta_ms: f32,
    /// Arm interpolation for traffic signals instead of snapping them.
    pub interpolate_signals: bool,
    pub camera: CameraTuning,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8586".into(),
            agents: 5,
            grid_width: 28,
            grid_height: 28,
            poll_every_frames: 10,
            interpolation_ms: 200.0,
            max_delta_ms: 100.0,
            interpolate_signals: false,
            camera: CameraTuning::default(),
        }
    }
}

impl ViewerConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Save the configuration as YAML (used to write a starter file).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
