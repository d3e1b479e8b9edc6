//! End-to-end behaviour of `CommentStream`: traversal-driven loads, deferred
//! arrivals, the reveal gate, and render planning.

use pretty_assertions::assert_eq;
use threadview_core::config::{StreamConfig, ViewMode};
use threadview_core::error::TriggerError;
use threadview_core::pagination::{LoadDecision, PageRequest, PageSource};
use threadview_core::stream::{CommentStream, UnseenSlot};
use threadview_core::types::CommentNode;
use threadview_core::window::{Row, RowMode};

#[derive(Debug, Default)]
struct FakeSource {
    has_more: bool,
    requests: Vec<PageRequest>,
}

impl PageSource for FakeSource {
    fn has_more(&self) -> bool {
        self.has_more
    }

    fn is_loading(&self) -> bool {
        false
    }

    fn request_page(&mut self, request: PageRequest) -> Result<(), TriggerError> {
        self.requests.push(request);
        Ok(())
    }
}

fn config(k: usize, view_mode: ViewMode) -> StreamConfig {
    StreamConfig {
        initial_render_threshold: k,
        overscan_rows: 0,
        view_mode,
        ..StreamConfig::default()
    }
}

fn seen_nodes(n: usize) -> Vec<CommentNode> {
    (0..n).map(|i| CommentNode::new(format!("n{i}"), Some(true))).collect()
}

#[test]
fn scenario_c_empty_scan_triggers_exactly_one_load() {
    let seq = seen_nodes(6);
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst));
    let mut source = FakeSource { has_more: true, ..FakeSource::default() };

    let refresh = stream.refresh_unseen(&seq, &mut source);
    assert_eq!(refresh.load, Some(LoadDecision::Requested { seq: 1 }));
    assert!(stream.session().unseen().first().is_none());

    // Re-running while the page is pending does not fetch again.
    let again = stream.refresh_unseen(&seq, &mut source);
    assert_eq!(again.load, Some(LoadDecision::InFlight));
    assert_eq!(source.requests.len(), 1);
}

#[test]
fn empty_scan_without_more_data_is_a_steady_state() {
    let seq = seen_nodes(3);
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst));
    let mut source = FakeSource::default();
    let refresh = stream.refresh_unseen(&seq, &mut source);
    assert_eq!(refresh.load, None);
    assert!(source.requests.is_empty());
}

#[test]
fn found_pointers_do_not_load_and_stale_slots_clear() {
    let mut seq = seen_nodes(5);
    seq[1].seen = Some(false);
    seq[4].seen = Some(false);
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst));
    let mut source = FakeSource { has_more: true, ..FakeSource::default() };

    let refresh = stream.refresh_unseen(&seq, &mut source);
    assert!(refresh.changed);
    assert_eq!(refresh.load, None);
    assert_eq!(stream.session().unseen().second().map(|p| p.visible_index), Some(4));

    assert!(!stream.refresh_unseen(&seq, &mut source).changed, "same inputs, same pointers");

    seq[4].seen = Some(true);
    stream.refresh_unseen(&seq, &mut source);
    assert_eq!(stream.session().unseen().first().map(|p| p.visible_index), Some(1));
    assert!(stream.session().unseen().second().is_none());
}

#[test]
fn scenario_e_deferred_items_leave_the_main_order() {
    let mut seq = seen_nodes(3);
    seq.push(CommentNode::new("a", None));
    seq.push(CommentNode::new("b", None));
    let mut stream = CommentStream::mount(config(20, ViewMode::OldestFirst));

    assert_eq!(stream.defer_arrivals(["a", "b"]), 2);

    let shown: Vec<_> = stream.shown(&seq).iter().map(|n| n.id.clone()).collect();
    assert_eq!(shown, vec!["n0", "n1", "n2"]);
    let deferred: Vec<_> = stream.deferred_view(&seq).iter().map(|n| n.id.clone()).collect();
    assert_eq!(deferred, vec!["a", "b"]);
}

#[test]
fn default_view_never_defers() {
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst));
    assert_eq!(stream.defer_arrivals(["a"]), 0);
    assert!(stream.session().deferred().is_empty());
}

#[test]
fn remount_clears_deferred_ids_and_gate() {
    let seq = seen_nodes(30);
    let mut stream = CommentStream::mount(config(5, ViewMode::OldestFirst));
    stream.defer_arrivals(["n29"]);
    assert!(stream.open_gate());

    stream.remount();
    assert!(stream.session().deferred().is_empty());
    assert!(!stream.session().gate().is_open());
    assert_eq!(stream.rendered_count(&seq), 5);
}

#[test]
fn gate_opening_releases_deferred_and_is_refused_while_loading() {
    let seq = seen_nodes(30);
    let mut stream = CommentStream::mount(config(5, ViewMode::OldestFirst));
    let mut source = FakeSource { has_more: true, ..FakeSource::default() };
    stream.defer_arrivals(["n29"]);
    assert_eq!(stream.rendered_count(&seq), 5);

    stream.try_load_more(&mut source);
    assert!(!stream.open_gate(), "disabled while a page is in flight");

    stream.complete_page(1, Ok(()));
    assert!(stream.open_gate());
    assert!(stream.session().deferred().is_empty());
    assert_eq!(stream.rendered_count(&seq), 30);
    assert!(!stream.open_gate());
}

#[test]
fn end_of_window_requests_a_page() {
    let seq = seen_nodes(8);
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst));
    stream.window_mut().set_viewport(4);
    let mut source = FakeSource { has_more: true, ..FakeSource::default() };

    let first = stream.on_scroll(&seq, 1, 10.0, &mut source);
    assert!(!first.window.end_reached);
    assert_eq!(first.load, None);

    let at_end = stream.on_scroll(&seq, 10, 10.0, &mut source);
    assert!(at_end.window.end_reached);
    assert_eq!(at_end.load, Some(LoadDecision::Requested { seq: 1 }));
}

#[test]
fn fast_scroll_plans_placeholder_rows() {
    let seq = seen_nodes(10);
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst));
    stream.window_mut().set_viewport(3);
    let mut source = FakeSource::default();

    let update = stream.on_scroll(&seq, 2, 450.0, &mut source);
    assert_eq!(update.window.mode, RowMode::Placeholder);
    assert_eq!(
        stream.plan_rows(&seq),
        vec![
            Row::Placeholder { index: 2 },
            Row::Placeholder { index: 3 },
            Row::Placeholder { index: 4 },
        ]
    );

    stream.on_scroll(&seq, 0, 0.0, &mut source);
    assert_eq!(stream.plan_rows(&seq)[0], Row::Comment { index: 2 });
}

#[test]
fn deferred_block_follows_item_k_minus_one_and_gate_trails() {
    let mut seq = seen_nodes(6);
    seq.push(CommentNode::new("mine", None));
    let mut stream = CommentStream::mount(config(3, ViewMode::OldestFirst));
    stream.window_mut().set_viewport(10);
    stream.defer_arrivals(["mine"]);

    assert_eq!(
        stream.plan_rows(&seq),
        vec![
            Row::Comment { index: 0 },
            Row::Comment { index: 1 },
            Row::Comment { index: 2 },
            Row::Deferred { id: "mine".to_owned() },
            Row::RevealGate,
        ]
    );
}

#[test]
fn deferred_block_anchors_after_last_item_in_short_stream() {
    let seq = vec![CommentNode::new("n0", Some(true)), CommentNode::new("mine", None)];
    let mut stream = CommentStream::mount(config(5, ViewMode::OldestFirst));
    stream.window_mut().set_viewport(10);
    stream.defer_arrivals(["mine"]);

    assert_eq!(
        stream.plan_rows(&seq),
        vec![Row::Comment { index: 0 }, Row::Deferred { id: "mine".to_owned() }]
    );
}

#[test]
fn scroll_to_unseen_moves_the_window() {
    let mut seq = seen_nodes(12);
    seq[3].seen = Some(false);
    seq[9].seen = Some(false);
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst));
    stream.window_mut().set_viewport(2);
    let mut source = FakeSource::default();
    stream.refresh_unseen(&seq, &mut source);

    assert_eq!(stream.scroll_to_unseen(UnseenSlot::Second, &seq), Some(9));
    assert_eq!(stream.window().scroll_offset(), 9);

    assert!(stream.set_focus(Some("n9".to_owned())));
    stream.refresh_unseen(&seq, &mut source);
    assert!(stream.session().unseen().second().is_none());
    assert_eq!(stream.scroll_to_unseen(UnseenSlot::Second, &seq), None);
}

#[test]
fn arrivals_after_gate_opens_are_not_withheld() {
    let mut stream = CommentStream::mount(config(5, ViewMode::OldestFirst));
    assert!(stream.open_gate());
    assert_eq!(stream.defer_arrivals(["late"]), 0);
    assert!(stream.session().deferred().is_empty());
}

#[test]
fn observer_on_stream_trigger_sees_traversal_loads() {
    use std::sync::{Arc, Mutex};
    use threadview_core::pagination::{LoadEvent, PaginationTrigger};

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let trigger =
        PaginationTrigger::new(4).with_observer(move |e| sink.lock().unwrap().push(e.clone()));
    let mut stream = CommentStream::mount(config(20, ViewMode::NewestFirst)).with_trigger(trigger);
    let mut source = FakeSource { has_more: true, ..FakeSource::default() };

    stream.refresh_unseen(&seen_nodes(2), &mut source);
    stream.complete_page(1, Ok(()));

    assert_eq!(
        *events.lock().unwrap(),
        vec![LoadEvent::Begin { seq: 1, page_size: 4 }, LoadEvent::Success { seq: 1 }]
    );
    assert_eq!(source.requests, vec![PageRequest { seq: 1, page_size: 4 }]);
}

#[test]
fn first_viewport_size_requests_a_page_when_the_end_is_already_visible() {
    let mut seq = seen_nodes(10);
    seq[3].seen = Some(false);
    let mut stream = CommentStream::mount(StreamConfig::default());
    let mut source = FakeSource { has_more: true, ..FakeSource::default() };

    // Page arrives before the first draw: nothing is known about the viewport.
    assert_eq!(stream.refresh_unseen(&seq, &mut source).load, None);
    assert!(!stream.on_scroll(&seq, 0, 0.0, &mut source).window.end_reached);
    assert!(source.requests.is_empty());

    let outcome = stream.set_viewport(&seq, 15, 0.0, &mut source).unwrap();
    assert!(outcome.window.end_reached);
    assert_eq!(outcome.load, Some(LoadDecision::Requested { seq: 1 }));
    assert_eq!(stream.window().visible_range(10), 0..10);

    // Redrawing at the same size does not re-check.
    assert_eq!(stream.set_viewport(&seq, 15, 0.0, &mut source), None);
    assert_eq!(source.requests.len(), 1);
}
