//! Rendering adapter: renderer-agnostic scene composition.
//!
//! # Invariants
//! - Composition never mutates the scene; the draw list derives from scene
//!   state and camera state.
//! - Draw order within a kind is deterministic (scene maps are ordered).
//!
//! The wgpu backend lives in `cityview-render-wgpu`; the trait here lets
//! the CLI and tests consume draw lists without a GPU.

mod composer;
mod geometry;
mod renderer;

pub use composer::{compose, DrawItem, LightingSettings, MaterialParams};
pub use geometry::{ground_plane, lane_markings, road_surface, FlatGeometry};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
