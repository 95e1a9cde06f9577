//! Mesh assets for the viewer: OBJ decoding into renderer-ready buffers and
//! a content-addressed registry binding entity kinds to meshes.
//!
//! A failed mesh load is fatal only to that kind's visual representation;
//! callers fall back to the built-in unit cube and keep rendering.

pub mod obj;
pub mod store;

pub use obj::{decode_obj, MeshData};
pub use store::{AssetError, AssetId, MeshStore};
