//! Comment stream renderer.
//!
//! Draws the rows planned by `CommentStream::plan_rows`. Every top-level item
//! takes a fixed [`ITEM_HEIGHT`] rows, which is how the viewport height turns
//! into an item count for the window manager.
//!
//! Overscan rows above the viewport are planned but skipped here; rows below it
//! are clipped by the `Paragraph`.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use threadview_core::types::{CommentBody, CommentNode, UnseenHit};
use threadview_core::window::Row;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Terminal rows per top-level item: header, body, replies summary.
pub const ITEM_HEIGHT: u16 = 3;

/// Whole items that fit in a panel interior `height` rows tall.
pub fn items_for_height(height: u16) -> usize {
    usize::from(height / ITEM_HEIGHT)
}

/// Renders the stream panel and caches its viewport size in the window.
pub fn render_stream(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let inner = inner_rect(area);
    state.set_viewport(items_for_height(inner.height));

    let title = if state.stream.session().view_mode().is_alternate() {
        " Comments (oldest first) "
    } else {
        " Comments (newest first) "
    };
    frame.render_widget(panel_block(title, state.mode == Mode::Normal, theme), area);

    let shown = state.stream.shown(&state.sequence);
    let rendered = state.stream.window().rendered_count(shown.len(), state.stream.session().gate());
    let visible_start = state.stream.window().visible_range(rendered).start;
    let focus = state.stream.session().focus();
    let loading = state.is_loading();

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut in_view = false;
    let mut in_deferred = false;
    for row in state.stream.plan_rows(&state.sequence) {
        match row {
            Row::Comment { index } | Row::Placeholder { index } if index < visible_start => {
                continue;
            }
            Row::Comment { index } => {
                in_view = true;
                let node = &shown[index];
                let focused = focus.is_some_and(|f| node.contains(f));
                lines.extend(comment_lines(node, &state.bodies, focused, theme));
            }
            Row::Placeholder { .. } => {
                in_view = true;
                lines.extend(placeholder_lines(inner.width, theme));
            }
            Row::Deferred { .. } | Row::RevealGate if !in_view => continue,
            Row::Deferred { id } => {
                if !in_deferred {
                    lines.push(Line::styled(
                        "── new comments ──",
                        Style::default().fg(theme.deferred_header).add_modifier(Modifier::BOLD),
                    ));
                    in_deferred = true;
                }
                lines.push(deferred_line(state.bodies.get(&id), theme));
                continue;
            }
            Row::RevealGate => {
                let hidden = shown.len().saturating_sub(rendered);
                lines.push(gate_line(hidden, loading, theme));
            }
        }
        in_deferred = false;
    }

    if lines.is_empty() {
        let msg = if loading { "  loading comments…" } else { "  no comments yet" };
        lines.push(Line::styled(msg, Style::default().fg(theme.muted)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn comment_lines(
    node: &CommentNode,
    bodies: &std::collections::HashMap<String, CommentBody>,
    focused: bool,
    theme: &Theme,
) -> [Line<'static>; 3] {
    let body = bodies.get(&node.id);
    let (marker, marker_fg) = match threadview_core::traversal::classify(node) {
        Some(UnseenHit::Root) => ("● ", theme.unseen_root),
        Some(UnseenHit::Child { .. }) => ("◐ ", theme.unseen_reply),
        None => ("  ", theme.muted),
    };
    let author = body.map_or("?", |b| b.author.as_str()).to_owned();
    let text = body.map_or(String::new(), |b| b.body.clone());

    let replies = node.children.len();
    let unseen_replies = node.children.iter().filter(|c| c.is_unseen()).count();
    let summary = match (replies, unseen_replies) {
        (0, _) => String::new(),
        (n, 0) => format!("    ↳ {n} repl{}", if n == 1 { "y" } else { "ies" }),
        (n, u) => format!("    ↳ {n} repl{}, {u} unseen", if n == 1 { "y" } else { "ies" }),
    };

    let base = if focused { Style::default().bg(theme.focus_bg) } else { Style::default() };
    [
        Line::from(vec![
            Span::styled(marker, base.fg(marker_fg)),
            Span::styled(author, base.fg(theme.author).add_modifier(Modifier::BOLD)),
        ])
        .style(base),
        Line::from(Span::styled(format!("  {text}"), base.fg(theme.text))).style(base),
        Line::from(Span::styled(summary, base.fg(theme.muted))).style(base),
    ]
}

fn placeholder_lines(width: u16, theme: &Theme) -> [Line<'static>; 3] {
    let style = Style::default().fg(theme.placeholder);
    let bar = |frac: u16| "░".repeat(usize::from(width.saturating_mul(frac) / 10));
    [
        Line::styled(format!("  {}", bar(3)), style),
        Line::styled(format!("  {}", bar(8)), style),
        Line::raw(""),
    ]
}

fn deferred_line(body: Option<&CommentBody>, theme: &Theme) -> Line<'static> {
    let (author, text) = body.map_or(("?", ""), |b| (b.author.as_str(), b.body.as_str()));
    Line::from(vec![
        Span::styled("  + ", Style::default().fg(theme.deferred_header)),
        Span::styled(format!("{author}: "), Style::default().fg(theme.author)),
        Span::styled(text.to_owned(), Style::default().fg(theme.deferred_text)),
    ])
}

fn gate_line(hidden: usize, loading: bool, theme: &Theme) -> Line<'static> {
    let (text, fg) = if loading {
        (format!("  [a] load all comments ({hidden} more), loading…"), theme.gate_disabled)
    } else {
        (format!("  [a] load all comments ({hidden} more)"), theme.gate)
    };
    Line::styled(text, Style::default().fg(fg).add_modifier(Modifier::BOLD))
}
