//! Keyboard input mapped to camera commands.
//!
//! # Invariants
//! - Camera control is level-triggered: commands are produced every frame a
//!   key is held, not on key-down edges.
//! - The window layer translates its own key codes into [`Key`]; nothing
//!   here depends on a windowing library.

pub mod action;
pub mod held;

pub use action::{commands, CameraCommand};
pub use held::{HeldKeys, Key};
