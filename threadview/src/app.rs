//! Central application state for threadview.
//!
//! `AppState` owns the upstream comment sequence, the comment bodies used by
//! the renderer, and the `CommentStream` that decides what is drawn. The
//! keybinding dispatcher and the event loop mutate it; the render module only
//! reads it (apart from caching the viewport size).
//!
//! The sequence is owned here, not by the stream. Every stream call borrows it
//! for the duration of that call.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

use threadview_core::config::StreamConfig;
use threadview_core::db::{self, NewComment, Page};
use threadview_core::stream::{CommentStream, UnseenSlot};
use threadview_core::types::{CommentBody, CommentNode};

use crate::event::AppEvent;
use crate::loader::types::{ArrivalPayload, PagePayload};
use crate::loader::worker::{ArrivalPoller, StorePageSource};
use crate::scroll::ScrollMeter;

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Full-screen help overlay is shown above the stream.
    HelpOverlay,
}

pub struct AppState {
    pub mode: Mode,
    pub help_scroll: u16,

    /// Top-level comments in upstream order, replies inline.
    pub sequence: Vec<CommentNode>,
    /// Content for every comment and reply received so far, by id.
    pub bodies: HashMap<String, CommentBody>,
    /// Number of arrivals appended at the end of `sequence` in oldest-first
    /// mode. Later pages are inserted in front of them.
    arrival_tail: usize,

    pub stream: CommentStream,
    source: StorePageSource,
    arrivals: ArrivalPoller,
    meter: ScrollMeter,

    conn: Connection,
    /// Posts made with `p`, numbered for the demo body text.
    posted: usize,
}

impl AppState {
    /// Builds the state for a freshly mounted view.
    ///
    /// # Arguments
    ///
    /// * `config`: validated stream settings
    /// * `conn`: the shared store connection
    /// * `tx`: event channel for loader results
    /// * `snapshot`: mount time; pages never include comments created later
    pub fn new(
        config: StreamConfig,
        conn: Connection,
        tx: UnboundedSender<AppEvent>,
        snapshot: i64,
    ) -> Self {
        let order = config.view_mode.sort_order();
        Self {
            mode: Mode::default(),
            help_scroll: 0,
            sequence: Vec::new(),
            bodies: HashMap::new(),
            arrival_tail: 0,
            stream: CommentStream::mount(config),
            source: StorePageSource::new(conn.clone(), tx.clone(), order, snapshot),
            arrivals: ArrivalPoller::new(conn.clone(), tx, snapshot),
            meter: ScrollMeter::default(),
            conn,
            posted: 0,
        }
    }

    /// Requests the first page.
    pub fn start(&mut self) {
        let decision = self.stream.try_load_more(&mut self.source);
        debug!(?decision, "initial page requested");
    }

    pub fn is_loading(&self) -> bool {
        self.stream.trigger().is_in_flight()
    }

    /// Items the window currently renders.
    pub fn rendered_count(&self) -> usize {
        self.stream.rendered_count(&self.sequence)
    }

    /// Records how many items fit on screen. A change re-checks the end of the
    /// window, so a short first page still pulls the next one.
    pub fn set_viewport(&mut self, items: usize) {
        let velocity = self.meter.velocity();
        let outcome =
            self.stream.set_viewport(&self.sequence, items, velocity, &mut self.source);
        if let Some(decision) = outcome.and_then(|o| o.load) {
            debug!(items, ?decision, "viewport resized at end of window");
        }
    }

    /// Scrolls by `delta` items and feeds the derived velocity to the window.
    pub fn scroll(&mut self, delta: i64) {
        let velocity = self.meter.record(delta, Instant::now());
        let outcome = self.stream.on_scroll(&self.sequence, delta, velocity, &mut self.source);
        if let Some(decision) = outcome.load {
            debug!(?decision, "end of window");
        }
    }

    pub fn scroll_half_page(&mut self, down: bool) {
        let half = (self.stream.window().viewport_items() / 2).max(1) as i64;
        self.scroll(if down { half } else { -half });
    }

    pub fn scroll_full_page(&mut self, down: bool) {
        let full = self.stream.window().viewport_items().max(1) as i64;
        self.scroll(if down { full } else { -full });
    }

    pub fn scroll_top(&mut self) {
        let offset = self.stream.window().scroll_offset() as i64;
        self.scroll(-offset);
    }

    pub fn scroll_bottom(&mut self) {
        let remaining = self.rendered_count() as i64 - self.stream.window().scroll_offset() as i64;
        self.scroll(remaining.max(0));
    }

    /// Logic tick: lets scroll motion come to rest and polls for arrivals.
    pub fn on_tick(&mut self) {
        if self.meter.settle(Instant::now()) {
            self.stream.on_scroll(&self.sequence, 0, 0.0, &mut self.source);
        }
        self.arrivals.poll();
    }

    /// Applies a finished page request.
    pub fn apply_page(&mut self, payload: PagePayload) {
        let PagePayload { seq, result } = payload;
        let (status, page) = match result {
            Ok(page) => (Ok(()), Some(page)),
            Err(err) => (Err(err), None),
        };
        // A stale page must not move the cursor, or the real one would be skipped.
        let Some(outcome) = self.stream.complete_page(seq, status) else {
            debug!(seq, "ignoring page for a request no longer in flight");
            return;
        };
        self.source.finish(page.as_ref());
        if let Some(page) = page {
            info!(
                seq = outcome.seq,
                items = page.nodes.len(),
                cursor = ?self.source.cursor(),
                "appending page"
            );
            self.append_page(page);
        }

        self.refresh_unseen();
        // The rendered count may have changed under a viewport already at the end.
        let velocity = self.meter.velocity();
        self.stream.on_scroll(&self.sequence, 0, velocity, &mut self.source);
    }

    /// Applies a finished arrival poll.
    pub fn apply_arrivals(&mut self, payload: ArrivalPayload) {
        self.arrivals.finish(&payload.result);
        let Ok(page) = payload.result else {
            return;
        };
        if page.nodes.is_empty() {
            return;
        }

        let ids: Vec<String> = page.nodes.iter().map(|n| n.id.clone()).collect();
        self.store_bodies(page.bodies);
        if self.stream.session().view_mode().is_alternate() {
            self.arrival_tail += page.nodes.len();
            self.sequence.extend(page.nodes);
            let deferred = self.stream.defer_arrivals(ids);
            info!(arrived = self.arrival_tail, deferred, "new comments at the end");
        } else {
            let count = page.nodes.len();
            prepend_arrivals(&mut self.sequence, page.nodes);
            info!(count, "new comments at the top");
        }
        self.refresh_unseen();
    }

    /// Makes the top visible item the traversal focus and marks it and its
    /// replies seen.
    pub fn focus_top(&mut self) {
        let offset = self.stream.window().scroll_offset();
        let Some(node) = self.stream.shown(&self.sequence).get(offset).cloned() else {
            return;
        };
        self.stream.set_focus(Some(node.id.clone()));
        let mut ids = vec![node.id.clone()];
        ids.extend(node.children.iter().map(|c| c.id.clone()));
        self.mark_seen(ids);
        self.refresh_unseen();
    }

    /// Jumps to an unseen pointer, focuses its target, and marks it seen.
    pub fn jump_to_unseen(&mut self, slot: UnseenSlot) {
        let unseen = self.stream.session().unseen();
        let pointer = match slot {
            UnseenSlot::First => unseen.first(),
            UnseenSlot::Second => unseen.second(),
        };
        let Some(target) = pointer.map(|p| p.target_id().to_owned()) else {
            debug!(?slot, "no unseen comment to jump to");
            return;
        };
        if let Some(index) = self.stream.scroll_to_unseen(slot, &self.sequence) {
            debug!(index, %target, "jumped to unseen comment");
        }
        self.stream.set_focus(Some(target.clone()));
        self.mark_seen(vec![target]);
        self.refresh_unseen();
    }

    /// Opens the reveal gate. Ignored while a page is loading.
    pub fn open_gate(&mut self) {
        if self.stream.open_gate() {
            self.refresh_unseen();
        }
    }

    /// Tears the view state down and mounts it again over the same sequence.
    pub fn remount(&mut self) {
        self.stream.remount();
        self.refresh_unseen();
    }

    /// Posts a comment as the viewer. It comes back through arrival polling.
    pub fn post_demo_comment(&mut self) {
        self.posted += 1;
        let conn = self.conn.clone();
        let body = format!("Posted from threadview (#{})", self.posted);
        tokio::spawn(async move {
            let comment = NewComment {
                author: "you".to_owned(),
                body,
                root_id: None,
                seen: None,
                created_at: None,
            };
            if let Err(err) = db::insert_comment(&conn, comment).await {
                warn!(%err, "failed to post comment");
            }
        });
    }

    /// Re-runs the unseen traversal over the current sequence.
    pub fn refresh_unseen(&mut self) {
        let refresh = self.stream.refresh_unseen(&self.sequence, &mut self.source);
        if let Some(decision) = refresh.load {
            debug!(?decision, "no unseen comments loaded yet");
        }
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.stream.trigger().last_failure()
    }

    fn append_page(&mut self, page: Page) {
        let Page { nodes, bodies, .. } = page;
        self.store_bodies(bodies);
        insert_page(&mut self.sequence, self.arrival_tail, nodes);
    }

    fn store_bodies(&mut self, bodies: Vec<CommentBody>) {
        self.bodies.extend(bodies.into_iter().map(|b| (b.id.clone(), b)));
    }

    /// Flips local unseen flags for `ids` and persists the change.
    fn mark_seen(&mut self, ids: Vec<String>) {
        let mut flipped = Vec::new();
        for node in &mut self.sequence {
            if node.is_unseen() && ids.contains(&node.id) {
                node.seen = Some(true);
                flipped.push(node.id.clone());
            }
            for child in &mut node.children {
                if child.is_unseen() && ids.contains(&child.id) {
                    child.seen = Some(true);
                    flipped.push(child.id.clone());
                }
            }
        }
        if flipped.is_empty() {
            return;
        }

        let conn = self.conn.clone();
        tokio::spawn(async move {
            match db::mark_seen(&conn, flipped).await {
                Ok(changed) => debug!(changed, "marked seen"),
                Err(err) => warn!(%err, "failed to mark comments seen"),
            }
        });
    }
}

/// Inserts a page in front of the last `arrival_tail` items, which are
/// arrivals already appended in oldest-first mode.
fn insert_page(sequence: &mut Vec<CommentNode>, arrival_tail: usize, nodes: Vec<CommentNode>) {
    let at = sequence.len().saturating_sub(arrival_tail);
    sequence.splice(at..at, nodes);
}

/// Puts arrivals at the top of a newest-first sequence. They come oldest
/// first, so the last one ends up on top.
fn prepend_arrivals(sequence: &mut Vec<CommentNode>, nodes: Vec<CommentNode>) {
    sequence.splice(0..0, nodes.into_iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use threadview_core::config::ViewMode;
    use threadview_core::db::PageCursor;
    use tokio::sync::mpsc;

    fn node(id: &str) -> CommentNode {
        CommentNode::new(id, Some(true))
    }

    fn ids(sequence: &[CommentNode]) -> Vec<&str> {
        sequence.iter().map(|n| n.id.as_str()).collect()
    }

    fn page(ids: &[&str], cursor: &str) -> Page {
        Page {
            nodes: ids.iter().map(|id| node(id)).collect(),
            bodies: Vec::new(),
            next_cursor: Some(PageCursor { created_at: 0, id: cursor.to_owned() }),
            has_more: true,
        }
    }

    async fn state(view_mode: ViewMode) -> (AppState, mpsc::UnboundedReceiver<AppEvent>) {
        let conn = Connection::open_in_memory().await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let config = StreamConfig { view_mode, ..StreamConfig::default() };
        (AppState::new(config, conn, tx, 0), rx)
    }

    #[test]
    fn later_pages_land_in_front_of_the_arrival_tail() {
        let mut seq = vec![node("p1"), node("p2"), node("new1"), node("new2")];
        insert_page(&mut seq, 2, vec![node("p3"), node("p4")]);
        assert_eq!(ids(&seq), vec!["p1", "p2", "p3", "p4", "new1", "new2"]);
    }

    #[test]
    fn page_without_arrivals_is_appended() {
        let mut seq = vec![node("p1")];
        insert_page(&mut seq, 0, vec![node("p2")]);
        assert_eq!(ids(&seq), vec!["p1", "p2"]);
    }

    #[test]
    fn newest_first_arrivals_are_prepended_newest_on_top() {
        let mut seq = vec![node("old")];
        prepend_arrivals(&mut seq, vec![node("a1"), node("a2"), node("a3")]);
        assert_eq!(ids(&seq), vec!["a3", "a2", "a1", "old"]);
    }

    #[tokio::test]
    async fn stale_page_is_dropped_and_leaves_the_cursor_alone() {
        let (mut app, _rx) = state(ViewMode::NewestFirst).await;
        app.start();
        assert!(app.is_loading());

        app.apply_page(PagePayload { seq: 9, result: Ok(page(&["x"], "x")) });
        assert!(app.sequence.is_empty());
        assert_eq!(app.source.cursor(), None);
        assert!(app.is_loading(), "the real request is still pending");

        app.apply_page(PagePayload { seq: 1, result: Ok(page(&["a", "b"], "b")) });
        assert_eq!(ids(&app.sequence), vec!["a", "b"]);
        assert_eq!(app.source.cursor().map(|c| c.id.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn oldest_first_arrivals_stay_behind_later_pages() {
        let (mut app, _rx) = state(ViewMode::OldestFirst).await;
        app.start();
        app.apply_page(PagePayload { seq: 1, result: Ok(page(&["p1"], "p1")) });

        app.apply_arrivals(ArrivalPayload { result: Ok(page(&["new"], "new")) });
        assert_eq!(app.stream.session().deferred().ids(), ["new".to_owned()]);

        // The first page held nothing unseen, so the traversal asked for the next one.
        let seq = app.stream.trigger().in_flight_seq().unwrap();
        assert_eq!(seq, 2);
        app.apply_page(PagePayload { seq, result: Ok(page(&["p2"], "p2")) });
        assert_eq!(ids(&app.sequence), vec!["p1", "p2", "new"]);
    }
}
