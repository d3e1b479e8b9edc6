//! UI rendering module for threadview.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs` and the
//! comment rows in `stream_view.rs`.

mod layout;
pub mod help;
pub mod keybindings;
pub mod stream_view;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Items the stream panel shows on a terminal `rows` tall.
///
/// Used on resize, before the next frame is drawn.
pub fn viewport_items(rows: u16) -> usize {
    stream_view::items_for_height(layout::stream_inner_height(rows))
}

/// Renders one complete frame: stream panel, status bar, and help overlay.
///
/// The stream renderer writes the viewport size back into the window manager,
/// so scroll distances for the next keypress use this frame's geometry.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [stream_area, status_bar] = compute_layout(frame);

    stream_view::render_stream(frame, stream_area, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_items_leave_room_for_borders_and_status_bar() {
        // 1 status row + 2 border rows, then 3 rows per item.
        assert_eq!(viewport_items(33), 10);
        assert_eq!(viewport_items(35), 10);
        assert_eq!(viewport_items(36), 11);
        assert_eq!(viewport_items(2), 0);
    }
}
