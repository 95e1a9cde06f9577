//! Shared types for the cityview viewer.
//!
//! # Invariants
//! - Grid-to-world mapping is a pure function, applied identically on spawn
//!   and update paths.
//! - Wire-facing enums decode tolerantly; world-facing types are strict.

pub mod config;
pub mod types;

pub use config::{CameraTuning, ConfigError, ViewerConfig};
pub use types::{grid_to_world, EntityId, EntityKind, GridExtent, Heading};
