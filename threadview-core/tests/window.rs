//! Window sizing, overscan, placeholder hysteresis, and end-of-window edges.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use threadview_core::gate::RevealGate;
use threadview_core::window::{PlaceholderPolicy, RowMode, WindowManager};

#[test]
fn scenario_d_gate_caps_rendered_count() {
    let window = WindowManager::new(5, 3, 300.0);
    let mut gate = RevealGate::closed();
    assert_eq!(window.rendered_count(8, &gate), 5);
    assert!(gate.is_visible(8, 5));

    assert!(gate.open());
    assert_eq!(window.rendered_count(8, &gate), 8);
    assert!(!gate.is_visible(8, 5));
    assert!(!gate.open(), "opening twice is not a transition");
}

#[test]
fn gate_is_moot_at_or_below_threshold() {
    let gate = RevealGate::closed();
    assert!(!gate.is_visible(5, 5));
    assert!(!gate.is_visible(0, 5));
}

#[test]
fn render_range_adds_overscan_on_both_sides() {
    let mut window = WindowManager::new(100, 3, 300.0);
    window.set_viewport(10);
    window.scroll_by(20, 100);
    assert_eq!(window.visible_range(100), 20..30);
    assert_eq!(window.render_range(100), 17..33);
}

#[test]
fn render_range_is_clamped_at_edges() {
    let mut window = WindowManager::new(100, 3, 300.0);
    window.set_viewport(10);
    assert_eq!(window.render_range(6), 0..6);
    window.scroll_by(1_000, 40);
    assert_eq!(window.scroll_offset(), 30);
    assert_eq!(window.render_range(40), 27..40);
}

#[test]
fn scroll_to_index_clamps_to_last_page() {
    let mut window = WindowManager::new(100, 0, 300.0);
    window.set_viewport(4);
    window.scroll_to_index(9, 10);
    assert_eq!(window.scroll_offset(), 6);
    window.page_up(10);
    assert_eq!(window.scroll_offset(), 2);
}

#[test]
fn placeholders_hold_until_velocity_is_zero() {
    let mut policy = PlaceholderPolicy::new(300.0);
    assert_eq!(policy.observe(120.0), RowMode::Real);
    assert_eq!(policy.observe(-300.0), RowMode::Placeholder);
    assert_eq!(policy.observe(40.0), RowMode::Placeholder, "slowing down is not stopping");
    assert_eq!(policy.observe(0.0), RowMode::Real);
}

#[test]
fn end_reached_fires_once_per_rendered_count() {
    let mut window = WindowManager::new(100, 0, 300.0);
    window.set_viewport(5);

    assert!(!window.apply(0, 0.0, 10).end_reached);
    assert!(window.apply(5, 0.0, 10).end_reached);
    assert!(!window.apply(0, 0.0, 10).end_reached, "sitting at the end does not re-fire");

    // A page arrived but the viewport still covers the old end: no edge.
    assert!(!window.apply(0, 0.0, 15).end_reached);
    assert!(window.apply(5, 0.0, 15).end_reached);
}

#[test]
fn short_stream_fires_end_immediately() {
    let mut window = WindowManager::new(100, 0, 300.0);
    window.set_viewport(10);
    assert!(window.end_reached(3));
    assert!(!window.end_reached(3));
    assert!(window.end_reached(4), "new items while at the end fire again");
}

#[test]
fn empty_stream_never_reaches_end() {
    let mut window = WindowManager::new(100, 0, 300.0);
    window.set_viewport(10);
    assert!(!window.end_reached(0));
    assert_eq!(window.render_range(0), 0..0);
}

proptest! {
    #[test]
    fn rendered_count_respects_gate(len in 0usize..500, k in 1usize..50, open in any::<bool>()) {
        let window = WindowManager::new(k, 2, 300.0);
        let mut gate = RevealGate::closed();
        if open {
            gate.open();
        }
        let expected = if open { len } else { len.min(k) };
        prop_assert_eq!(window.rendered_count(len, &gate), expected);
    }

    #[test]
    fn render_range_stays_in_bounds(
        rendered in 0usize..200,
        viewport in 0usize..40,
        deltas in prop::collection::vec(-50i64..50, 0..20),
    ) {
        let mut window = WindowManager::new(200, 3, 300.0);
        window.set_viewport(viewport);
        for d in deltas {
            window.scroll_by(d, rendered);
            let range = window.render_range(rendered);
            prop_assert!(range.start <= range.end);
            prop_assert!(range.end <= rendered);
            let visible = window.visible_range(rendered);
            prop_assert!(range.start <= visible.start && visible.end <= range.end);
        }
    }
}
