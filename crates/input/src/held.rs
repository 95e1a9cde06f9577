use std::collections::HashSet;

/// A key the viewer reacts to. The window layer maps its own key codes into
/// these; everything else is ignored at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    W,
    A,
    S,
    D,
    ZoomIn,
    ZoomOut,
}

/// The set of keys currently held down.
///
/// Updated from window events; read once per frame to derive camera
/// commands. Duplicate presses and releases of untracked keys are no-ops.
#[derive(Debug, Default)]
pub struct HeldKeys {
    held: HashSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Drop everything held, e.g. when the window loses focus. Without this
    /// a key released while unfocused stays stuck.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keys = HeldKeys::new();
        keys.press(Key::W);
        assert!(keys.is_held(Key::W));
        keys.release(Key::W);
        assert!(!keys.is_held(Key::W));
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut keys = HeldKeys::new();
        keys.press(Key::ArrowLeft);
        keys.press(Key::ArrowLeft);
        keys.release(Key::ArrowLeft);
        assert!(keys.is_empty());
    }

    #[test]
    fn clear_on_focus_loss() {
        let mut keys = HeldKeys::new();
        keys.press(Key::A);
        keys.press(Key::ZoomIn);
        keys.clear();
        assert!(keys.is_empty());
    }
}
