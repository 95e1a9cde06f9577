//! Simulation server client.
//!
//! The server owns the simulation; this crate performs the HTTP round trips
//! (init / getEntities / update), decodes snapshots with per-record
//! tolerance, and runs the poll loop on a background thread so a slow or
//! failed fetch never blocks a frame.
//!
//! # Invariants
//! - At most one poll request is outstanding at a time.
//! - Every polled snapshot carries a monotone sequence number.
//! - A transport failure means "no change this cycle"; the next cycle
//!   retries unconditionally.

pub mod http;
pub mod poller;
pub mod source;
pub mod wire;

pub use http::{ClientError, SimulationClient};
pub use poller::{BackgroundPoller, PollEvent};
pub use source::{LiveSource, SnapshotSource};
