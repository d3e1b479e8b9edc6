//! Keybinding dispatcher for threadview.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue or quit. The
//! dispatcher branches first on `state.mode` so the help overlay and the
//! stream have isolated handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use threadview_core::stream::UnseenSlot;

use crate::app::{AppState, Mode};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
///
/// # Arguments
///
/// * `key`  : the raw crossterm key event (code + modifiers)
/// * `state`: mutable reference to all UI state
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('n') => state.jump_to_unseen(UnseenSlot::First),
        KeyCode::Char('N') => state.jump_to_unseen(UnseenSlot::Second),
        KeyCode::Enter => state.focus_top(),
        KeyCode::Char('a') => state.open_gate(),
        KeyCode::Char('p') => state.post_demo_comment(),
        KeyCode::Char('r') => state.remount(),
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        _ => {}
    }
    KeyAction::Continue
}

/// Handles j / k / g / G and the Ctrl page keys.
///
/// Returns `None` when the key should fall through to the rest of the Normal
/// handler.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll(-1),
        KeyCode::Char('g') | KeyCode::Home => state.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.scroll_half_page(true),
        KeyCode::Char('u') if ctrl => state.scroll_half_page(false),
        KeyCode::Char('f') if ctrl => state.scroll_full_page(true),
        KeyCode::Char('b') if ctrl => state.scroll_full_page(false),
        KeyCode::PageDown => state.scroll_full_page(true),
        KeyCode::PageUp => state.scroll_full_page(false),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Wheel notches scroll the stream one comment each, or the help overlay by
/// three lines while it is open.
///
/// The mouse never quits, so unlike [`handle_key`] nothing is returned.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) {
    let down = match mouse.kind {
        MouseEventKind::ScrollDown => true,
        MouseEventKind::ScrollUp => false,
        _ => return,
    };
    if state.mode == Mode::HelpOverlay {
        state.help_scroll = if down {
            state.help_scroll.saturating_add(3)
        } else {
            state.help_scroll.saturating_sub(3)
        };
    } else {
        state.scroll(if down { 1 } else { -1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use threadview_core::config::StreamConfig;
    use tokio::sync::mpsc;

    async fn state() -> AppState {
        let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        AppState::new(StreamConfig::default(), conn, tx, 0)
    }

    fn wheel(kind: MouseEventKind) -> MouseEvent {
        MouseEvent { kind, column: 0, row: 0, modifiers: KeyModifiers::NONE }
    }

    #[tokio::test]
    async fn wheel_scrolls_help_by_three_lines() {
        let mut state = state().await;
        state.mode = Mode::HelpOverlay;
        handle_mouse(wheel(MouseEventKind::ScrollDown), &mut state);
        handle_mouse(wheel(MouseEventKind::ScrollDown), &mut state);
        handle_mouse(wheel(MouseEventKind::ScrollUp), &mut state);
        assert_eq!(state.help_scroll, 3);
        assert_eq!(state.mode, Mode::HelpOverlay);
    }

    #[tokio::test]
    async fn q_quits_but_only_outside_help() {
        let mut state = state().await;
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        state.mode = Mode::HelpOverlay;
        assert_eq!(handle_key(q, &mut state), KeyAction::Continue);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(handle_key(q, &mut state), KeyAction::Quit);
    }
}
