//! Developer tooling: read-only scene queries for the panel and CLI.
//!
//! # Invariants
//! - Tools never mutate the scene.

pub mod inspector;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary};
