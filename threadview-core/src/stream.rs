//! `CommentStream` wires the session, window, and pagination trigger together.
//!
//! The upstream sequence is never owned here. Every method that needs it takes
//! a `&[CommentNode]` for the duration of one call, mirroring a render pass.
//!
//! # Control flow
//!
//! - scroll samples go to the window; reaching the end of the rendered window
//!   asks the trigger for another page
//! - focus or sequence changes re-run the unseen traversal over the shown
//!   (deferred-filtered) sequence; an empty result with more data upstream
//!   also asks the trigger for another page
//! - the deferred queue filters what the window renders

use std::borrow::Cow;

use tracing::{debug, info};

use crate::config::StreamConfig;
use crate::error::PageError;
use crate::pagination::{LoadDecision, PageOutcome, PageSource, PaginationTrigger};
use crate::session::SessionState;
use crate::traversal;
use crate::types::CommentNode;
use crate::window::{Row, RowMode, WindowManager, WindowUpdate};

/// Which of the two unseen slots to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnseenSlot {
    First,
    Second,
}

/// Result of [`CommentStream::refresh_unseen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    /// The unseen slots changed.
    pub changed: bool,
    /// Set when the scan came up empty and a page load was attempted.
    pub load: Option<LoadDecision>,
}

/// Result of [`CommentStream::on_scroll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub window: WindowUpdate,
    /// Set when the end was reached and a page load was attempted.
    pub load: Option<LoadDecision>,
}

#[derive(Debug)]
pub struct CommentStream {
    config: StreamConfig,
    session: SessionState,
    window: WindowManager,
    trigger: PaginationTrigger,
}

impl CommentStream {
    /// Mounts a stream for `config`.
    pub fn mount(config: StreamConfig) -> Self {
        let session = SessionState::mount(config.view_mode);
        let window = window_for(&config);
        let trigger = PaginationTrigger::new(config.page_size);
        Self { config, session, window, trigger }
    }

    /// Replaces the trigger, e.g. with one carrying an observer.
    #[must_use]
    pub fn with_trigger(mut self, trigger: PaginationTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Tears the view down and mounts it again.
    ///
    /// Session and window state start over. The trigger is kept so that a
    /// page already in flight can still complete against it.
    pub fn remount(&mut self) {
        let fresh = SessionState::mount(self.config.view_mode);
        std::mem::replace(&mut self.session, fresh).unmount();
        self.window = window_for(&self.config);
    }

    pub fn unmount(self) {
        self.session.unmount();
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn window(&self) -> &WindowManager {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut WindowManager {
        &mut self.window
    }

    pub fn trigger(&self) -> &PaginationTrigger {
        &self.trigger
    }

    /// The sequence the window renders: upstream minus deferred items.
    pub fn shown<'a>(&self, sequence: &'a [CommentNode]) -> Cow<'a, [CommentNode]> {
        self.session.deferred().shown(sequence)
    }

    /// Exactly the deferred items, in upstream order.
    pub fn deferred_view<'a>(&self, sequence: &'a [CommentNode]) -> Vec<&'a CommentNode> {
        self.session.deferred().deferred_view(sequence)
    }

    /// Items the window renders for `sequence`, honouring the reveal gate.
    pub fn rendered_count(&self, sequence: &[CommentNode]) -> usize {
        let len = self.shown(sequence).len();
        self.window.rendered_count(len, self.session.gate())
    }

    /// Moves the traversal anchor. Returns `true` if it changed; callers then
    /// re-run [`CommentStream::refresh_unseen`].
    pub fn set_focus(&mut self, focus: Option<String>) -> bool {
        self.session.set_focus(focus)
    }

    /// Re-runs the unseen traversal and stores the pointers.
    ///
    /// When nothing unseen is found locally, another page is requested on the
    /// assumption that unseen comments may be further upstream.
    pub fn refresh_unseen<S>(&mut self, sequence: &[CommentNode], source: &mut S) -> Refresh
    where
        S: PageSource + ?Sized,
    {
        let scan = {
            let shown = self.shown(sequence);
            traversal::scan(&shown, self.session.focus())
        };
        let empty = scan.is_empty();
        let changed = self.session.unseen_mut().apply(scan);
        if changed {
            debug!(
                first = ?self.session.unseen().first().map(|p| p.visible_index),
                second = ?self.session.unseen().second().map(|p| p.visible_index),
                "unseen pointers updated"
            );
        }

        let load = if empty && source.has_more() && !source.is_loading() {
            Some(self.trigger.try_load_more(source))
        } else {
            None
        };
        Refresh { changed, load }
    }

    /// Applies one scroll sample from the host.
    ///
    /// # Arguments
    ///
    /// * `delta`: items scrolled since the last sample (positive = down)
    /// * `velocity`: instantaneous scroll speed in rows per second
    pub fn on_scroll<S>(
        &mut self,
        sequence: &[CommentNode],
        delta: i64,
        velocity: f32,
        source: &mut S,
    ) -> ScrollOutcome
    where
        S: PageSource + ?Sized,
    {
        let rendered = self.rendered_count(sequence);
        let window = self.window.apply(delta, velocity, rendered);
        let load = if window.end_reached {
            debug!(rendered, "end of window reached");
            Some(self.trigger.try_load_more(source))
        } else {
            None
        };
        ScrollOutcome { window, load }
    }

    /// Records a new viewport size in items.
    ///
    /// A changed size can bring the end of the rendered window into view
    /// without any scrolling, so the end check runs again with a zero delta.
    /// Returns `None` when the size is unchanged.
    pub fn set_viewport<S>(
        &mut self,
        sequence: &[CommentNode],
        items: usize,
        velocity: f32,
        source: &mut S,
    ) -> Option<ScrollOutcome>
    where
        S: PageSource + ?Sized,
    {
        if !self.window.set_viewport(items) {
            return None;
        }
        Some(self.on_scroll(sequence, 0, velocity, source))
    }

    /// Asks for the next page directly, subject to the single-flight guard.
    pub fn try_load_more<S>(&mut self, source: &mut S) -> LoadDecision
    where
        S: PageSource + ?Sized,
    {
        self.trigger.try_load_more(source)
    }

    /// Reports the result of page request `seq`.
    pub fn complete_page(&mut self, seq: u64, result: Result<(), PageError>) -> Option<PageOutcome> {
        self.trigger.complete(seq, result)
    }

    /// Opens the reveal gate on user request.
    ///
    /// Refused while a page is loading. Opening releases all deferred items
    /// into the main order. Returns `true` if the gate opened.
    pub fn open_gate(&mut self) -> bool {
        if self.trigger.is_in_flight() {
            debug!("reveal gate disabled while a page is loading");
            return false;
        }
        if !self.session.gate_mut().open() {
            return false;
        }
        let released = self.session.deferred_mut().release();
        info!(released = released.len(), "reveal gate opened");
        true
    }

    /// Withholds newly arrived ids (alternate view only). Returns how many
    /// were added.
    ///
    /// Once the gate is open the whole stream is rendered, so arrivals go
    /// straight into the main order and nothing is withheld.
    pub fn defer_arrivals<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.session.gate().is_open() {
            return 0;
        }
        self.session.deferred_mut().defer(ids)
    }

    /// Scrolls so that the chosen unseen pointer is the first visible item.
    ///
    /// Returns the index scrolled to, or `None` if the slot is empty.
    pub fn scroll_to_unseen(&mut self, slot: UnseenSlot, sequence: &[CommentNode]) -> Option<usize> {
        let unseen = self.session.unseen();
        let pointer = match slot {
            UnseenSlot::First => unseen.first(),
            UnseenSlot::Second => unseen.second(),
        }?;
        let index = pointer.visible_index;
        let rendered = self.rendered_count(sequence);
        self.window.scroll_to_index(index, rendered);
        Some(index)
    }

    /// Rows for one render pass, in display order.
    ///
    /// In real mode, while the gate is closed in the alternate view, deferred
    /// items are drawn as one block after item K-1 (or after the last item when
    /// fewer than K are shown). The gate control follows the last rendered
    /// item whenever it is visible.
    pub fn plan_rows(&self, sequence: &[CommentNode]) -> Vec<Row> {
        let shown_len = self.shown(sequence).len();
        let gate = self.session.gate();
        let threshold = self.window.threshold();
        let rendered = self.window.rendered_count(shown_len, gate);
        let range = self.window.render_range(rendered);
        let mode = self.window.mode();

        let deferred = self.session.deferred();
        let block_anchor = (mode == RowMode::Real
            && deferred.is_active()
            && !deferred.is_empty()
            && !gate.is_open()
            && rendered > 0)
            .then(|| threshold.min(rendered) - 1);

        let mut rows = Vec::with_capacity(range.len() + deferred.len() + 1);
        for index in range.clone() {
            rows.push(match mode {
                RowMode::Real => Row::Comment { index },
                RowMode::Placeholder => Row::Placeholder { index },
            });
            if block_anchor == Some(index) {
                rows.extend(
                    deferred
                        .deferred_view(sequence)
                        .into_iter()
                        .map(|node| Row::Deferred { id: node.id.clone() }),
                );
            }
        }
        if !range.is_empty() && range.end == rendered && gate.is_visible(shown_len, threshold) {
            rows.push(Row::RevealGate);
        }
        rows
    }
}

fn window_for(config: &StreamConfig) -> WindowManager {
    WindowManager::new(
        config.initial_render_threshold,
        config.overscan_rows,
        config.placeholder_enter_velocity,
    )
}
