//! Layout and frame chrome for threadview.
//!
//! Pure layout arithmetic plus the status bar. Called inside `terminal.draw()`
//! on every render so each frame reflects the current terminal size.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::AppState;
use crate::theme::Theme;

/// Returns `[stream, status_bar]` for the current frame.
///
/// The stream fills everything above a 1-row status bar.
pub fn compute_layout(frame: &Frame) -> [Rect; 2] {
    frame
        .area()
        .layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(STATUS_BAR_ROWS)]))
}

/// Height of the status bar in `compute_layout`.
const STATUS_BAR_ROWS: u16 = 1;

/// Interior height of the stream panel on a terminal `rows` tall.
///
/// Matches `inner_rect(compute_layout(frame)[0]).height` without a frame.
pub fn stream_inner_height(rows: u16) -> u16 {
    rows.saturating_sub(STATUS_BAR_ROWS + 2)
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds the bordered `Block` around the stream.
///
/// # Arguments
///
/// * `title`: shown in the top border
/// * `is_active`: thick border while the stream has input (no overlay open)
/// * `theme`: supplies `border_active` / `border_inactive`
pub fn panel_block<'a>(title: &'a str, is_active: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_active {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_active { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
}

/// Renders the 1-row status bar.
///
/// Left to right: view mode, rendered/loaded counts, unseen pointer positions,
/// withheld arrivals, and either the loading indicator or the last page error.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let session = state.stream.session();
    let mode_text = if session.view_mode().is_alternate() { " OLDEST " } else { " NEWEST " };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(theme.status_mode).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}/{} shown ", state.rendered_count(), state.sequence.len())),
    ];

    let unseen = session.unseen();
    let slot = |p: Option<&threadview_core::types::UnseenPointer>| {
        p.map_or_else(|| "-".to_owned(), |p| (p.visible_index + 1).to_string())
    };
    spans.push(Span::raw(format!(
        " unseen n:{} N:{} ",
        slot(unseen.first()),
        slot(unseen.second())
    )));

    let deferred = session.deferred().len();
    if deferred > 0 {
        spans.push(Span::styled(
            format!(" {deferred} new "),
            Style::default().fg(theme.deferred_header),
        ));
    }

    if state.is_loading() {
        spans.push(Span::styled(" loading… ", Style::default().fg(theme.status_loading)));
    } else if let Some(err) = state.last_failure() {
        spans.push(Span::styled(format!(" {err} "), Style::default().fg(theme.status_error)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
