//! wgpu render backend for the city viewer.
//!
//! Renders the flat ground/road/lane layers and per-kind instanced entity
//! meshes. Camera uses an orbit model around the grid center.
//!
//! # Invariants
//! - The renderer never mutates scene state; it consumes composed draw lists.
//! - Camera motion is view-only and independent of polling.
//! - Static road geometry is uploaded once per reconciled road snapshot, not
//!   per frame.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
