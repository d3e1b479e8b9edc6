//! Transient per-mount UI state.
//!
//! `SessionState` replaces an untyped shared key-value store with one struct
//! whose fields are reached through scoped accessors: the traversal writes
//! only the unseen slots, the gate control only the gate, the arrival feed only
//! the deferred queue. Nothing here outlives the view it was mounted for.

use tracing::debug;

use crate::config::ViewMode;
use crate::deferred::DeferredQueue;
use crate::gate::RevealGate;
use crate::traversal::UnseenScan;
use crate::types::UnseenPointer;

/// The first and second next-unseen pointers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnseenSlots {
    first: Option<UnseenPointer>,
    second: Option<UnseenPointer>,
}

impl UnseenSlots {
    pub fn first(&self) -> Option<&UnseenPointer> {
        self.first.as_ref()
    }

    pub fn second(&self) -> Option<&UnseenPointer> {
        self.second.as_ref()
    }

    /// Replaces both slots with a scan result. Slots without a result are
    /// cleared. Returns `true` if anything changed.
    pub fn apply(&mut self, scan: UnseenScan) -> bool {
        let changed = self.first != scan.first || self.second != scan.second;
        self.first = scan.first;
        self.second = scan.second;
        changed
    }
}

#[derive(Debug)]
pub struct SessionState {
    view_mode: ViewMode,
    focus: Option<String>,
    unseen: UnseenSlots,
    gate: RevealGate,
    deferred: DeferredQueue,
}

impl SessionState {
    /// Creates the state for a fresh mount of the view.
    ///
    /// The steps run in a fixed order: build the store, clear the deferred set,
    /// and only then hand the state to the first render.
    pub fn mount(view_mode: ViewMode) -> Self {
        let mut state = Self {
            view_mode,
            focus: None,
            unseen: UnseenSlots::default(),
            gate: RevealGate::closed(),
            deferred: DeferredQueue::new(view_mode.is_alternate()),
        };
        state.deferred.clear();
        debug!(?view_mode, "session mounted");
        state
    }

    /// Discards the state at view teardown.
    pub fn unmount(self) {
        debug!(
            view_mode = ?self.view_mode,
            deferred = self.deferred.len(),
            "session unmounted"
        );
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Sets the traversal anchor. Returns `true` if it changed.
    pub fn set_focus(&mut self, focus: Option<String>) -> bool {
        if self.focus == focus {
            return false;
        }
        self.focus = focus;
        true
    }

    pub fn unseen(&self) -> &UnseenSlots {
        &self.unseen
    }

    pub fn unseen_mut(&mut self) -> &mut UnseenSlots {
        &mut self.unseen
    }

    pub fn gate(&self) -> &RevealGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut RevealGate {
        &mut self.gate
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    pub fn deferred_mut(&mut self) -> &mut DeferredQueue {
        &mut self.deferred
    }
}
