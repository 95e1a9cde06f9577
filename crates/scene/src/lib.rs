//! Scene kernel: the client-side authoritative entity set.
//!
//! The server owns simulation truth; this crate reconciles its polled
//! snapshots into a continuously renderable scene.
//!
//! # Invariants
//! - Exactly one live entity per (kind, id); ids absent from the latest
//!   reconciled snapshot are gone before the next composition.
//! - Interpolation restarts from the current rendered position, never from
//!   the previous target.
//! - All mutation happens on the render-tick thread, strictly sequenced:
//!   reconcile, then advance, then compose.

pub mod clock;
pub mod entity;
pub mod snapshot;
pub mod state;

pub use clock::FrameClock;
pub use entity::{Entity, KindData};
pub use snapshot::{KindSnapshot, SnapshotRecord};
pub use state::{ApplyOutcome, SceneConfig, SceneState};
