//! Window manager: decides which items of the stream are materialized.
//!
//! Only the slice under the viewport (plus an overscan margin on each side) is
//! rendered, so drawing cost is O(viewport) no matter how long the stream is.
//! Positions are counted in items, not terminal rows; the host converts its
//! viewport height into an item count with [`WindowManager::set_viewport`].
//!
//! # Placeholder mode
//!
//! While scrolling fast, rows are drawn as skeleton placeholders. The mode is
//! entered once `|velocity| >= enter_velocity` and left only when the velocity
//! is exactly zero, so slowing down without stopping keeps the placeholders.
//!
//! # End of window
//!
//! [`WindowManager::end_reached`] is edge-triggered: it fires when the last
//! rendered item comes into view, or when it is in view and the rendered count
//! has changed since the last firing. Sitting at the end does not re-fire.

use std::ops::Range;

use tracing::debug;

use crate::gate::RevealGate;

/// How rows are drawn this pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowMode {
    #[default]
    Real,
    Placeholder,
}

/// One entry in a render pass, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Real content for the shown item at `index`.
    Comment { index: usize },
    /// Skeleton stand-in for the shown item at `index`.
    Placeholder { index: usize },
    /// A withheld new arrival, drawn in its own block.
    Deferred { id: String },
    /// The "load all" control that opens the reveal gate.
    RevealGate,
}

/// Velocity hysteresis for [`RowMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderPolicy {
    enter_velocity: f32,
    active: bool,
}

impl PlaceholderPolicy {
    pub fn new(enter_velocity: f32) -> Self {
        Self { enter_velocity, active: false }
    }

    /// Feeds one velocity sample and returns the resulting mode.
    pub fn observe(&mut self, velocity: f32) -> RowMode {
        if self.active {
            if velocity == 0.0 {
                self.active = false;
            }
        } else if velocity.abs() >= self.enter_velocity {
            self.active = true;
        }
        self.mode()
    }

    pub fn mode(&self) -> RowMode {
        if self.active { RowMode::Placeholder } else { RowMode::Real }
    }
}

/// What changed after one scroll sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowUpdate {
    pub render_range: Range<usize>,
    pub mode: RowMode,
    /// The end of the rendered window was just reached.
    pub end_reached: bool,
}

#[derive(Debug, Clone)]
pub struct WindowManager {
    threshold: usize,
    overscan: usize,
    placeholder: PlaceholderPolicy,
    scroll_offset: usize,
    viewport_items: usize,
    was_at_end: bool,
    last_end_count: Option<usize>,
}

impl WindowManager {
    /// # Arguments
    ///
    /// * `threshold`: items rendered while the reveal gate is closed (K)
    /// * `overscan`: extra items rendered above and below the viewport
    /// * `enter_velocity`: rows/second at which placeholder mode starts
    pub fn new(threshold: usize, overscan: usize, enter_velocity: f32) -> Self {
        Self {
            threshold,
            overscan,
            placeholder: PlaceholderPolicy::new(enter_velocity),
            scroll_offset: 0,
            viewport_items: 0,
            was_at_end: false,
            last_end_count: None,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_items(&self) -> usize {
        self.viewport_items
    }

    pub fn mode(&self) -> RowMode {
        self.placeholder.mode()
    }

    /// Number of items to render for a shown sequence of length `len`.
    pub fn rendered_count(&self, len: usize, gate: &RevealGate) -> usize {
        if gate.is_open() { len } else { len.min(self.threshold) }
    }

    /// Updates how many items fit in the viewport (cached from the last draw).
    /// Returns `true` if the count changed.
    pub fn set_viewport(&mut self, items: usize) -> bool {
        let changed = self.viewport_items != items;
        self.viewport_items = items;
        changed
    }

    /// Items currently under the viewport.
    pub fn visible_range(&self, rendered: usize) -> Range<usize> {
        if rendered == 0 || self.viewport_items == 0 {
            return 0..0;
        }
        let start = self.scroll_offset.min(rendered - 1);
        let end = (start + self.viewport_items).min(rendered);
        start..end
    }

    /// Items to materialize: the visible range widened by the overscan margin.
    pub fn render_range(&self, rendered: usize) -> Range<usize> {
        let visible = self.visible_range(rendered);
        if visible.is_empty() {
            return visible;
        }
        let start = visible.start.saturating_sub(self.overscan);
        let end = visible.end.saturating_add(self.overscan).min(rendered);
        start..end
    }

    /// Scrolls by `delta` items (positive = towards the end), clamped.
    pub fn scroll_by(&mut self, delta: i64, rendered: usize) {
        let max_offset = self.max_offset(rendered) as i64;
        let next = (self.scroll_offset as i64).saturating_add(delta).clamp(0, max_offset);
        self.scroll_offset = next as usize;
    }

    /// Imperative jump so that `index` is the first visible item.
    pub fn scroll_to_index(&mut self, index: usize, rendered: usize) {
        self.scroll_offset = index.min(self.max_offset(rendered));
    }

    pub fn page_down(&mut self, rendered: usize) {
        self.scroll_by(self.viewport_items.max(1) as i64, rendered);
    }

    pub fn page_up(&mut self, rendered: usize) {
        self.scroll_by(-(self.viewport_items.max(1) as i64), rendered);
    }

    /// Feeds a velocity sample into the placeholder policy.
    pub fn observe_velocity(&mut self, velocity: f32) -> RowMode {
        let before = self.placeholder.mode();
        let after = self.placeholder.observe(velocity);
        if before != after {
            debug!(?after, velocity, "row mode changed");
        }
        after
    }

    /// Edge-triggered end-of-window check. See the module docs.
    pub fn end_reached(&mut self, rendered: usize) -> bool {
        let at_end = rendered > 0 && self.visible_range(rendered).end >= rendered;
        let fire = at_end && (!self.was_at_end || self.last_end_count != Some(rendered));
        self.was_at_end = at_end;
        if fire {
            self.last_end_count = Some(rendered);
        }
        fire
    }

    /// Applies one scroll sample: offset delta first, then velocity.
    pub fn apply(&mut self, delta: i64, velocity: f32, rendered: usize) -> WindowUpdate {
        self.scroll_by(delta, rendered);
        let mode = self.observe_velocity(velocity);
        WindowUpdate {
            render_range: self.render_range(rendered),
            mode,
            end_reached: self.end_reached(rendered),
        }
    }

    fn max_offset(&self, rendered: usize) -> usize {
        if self.viewport_items > 0 {
            rendered.saturating_sub(self.viewport_items)
        } else {
            rendered.saturating_sub(1)
        }
    }
}
