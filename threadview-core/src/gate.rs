//! Reveal gate: caps the initial rendered volume until the user opts in.

/// One-way toggle. Starts closed; once opened it stays open for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealGate {
    open: bool,
}

impl RevealGate {
    pub fn closed() -> Self {
        Self { open: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the gate. Returns `true` only on the closed-to-open transition.
    pub fn open(&mut self) -> bool {
        let was_closed = !self.open;
        self.open = true;
        was_closed
    }

    /// Whether the gate control should be shown for a sequence of `len` items.
    ///
    /// Below or at `threshold` the gate is moot and never shown.
    pub fn is_visible(&self, len: usize, threshold: usize) -> bool {
        !self.open && len > threshold
    }
}
