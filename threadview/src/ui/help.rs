//! Help overlay renderer for threadview.
//!
//! Draws a centred modal over the stream using ratatui's `Clear` widget to
//! erase the background first, inside the same `terminal.draw()` closure as
//! everything else.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal.
///
/// Skipped on terminals narrower than 60 columns, where the modal would not
/// fit.
///
/// # Arguments
///
/// * `frame`: current render frame provided by `terminal.draw()`
/// * `theme`: active color theme (supplies `border_active` for the modal border)
/// * `help_scroll`: vertical scroll offset, driven by j/k while the overlay is open
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help: j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Scrolling"),
        Line::from("  j / k         Down / up one comment"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from("  Ctrl-f / b    Full page down / up"),
        Line::from("  g / G         Top / end of the loaded stream"),
        Line::from("  wheel         One comment per notch"),
        Line::from(""),
        Line::from("Unseen comments"),
        Line::from("  ●             The comment itself is unseen"),
        Line::from("  ◐             One of its replies is unseen"),
        Line::from("  n             Jump to the next unseen comment"),
        Line::from("  N             Jump to the one after that"),
        Line::from("  Enter         Focus the top comment and mark its thread seen"),
        Line::from(""),
        Line::from("Stream"),
        Line::from("  a             Load all comments (lifts the initial cap)"),
        Line::from("  p             Post a demo comment"),
        Line::from("  r             Reset the view (cap and new-comment block)"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit"),
    ])
}
