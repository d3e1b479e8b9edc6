//! Color theme system for threadview.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every surface
//! the stream view draws. Two built-in themes are provided:
//!
//! - `dark`: uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use tracing::warn;

/// All color values used across threadview's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Frame
    pub border_active: Color,
    pub border_inactive: Color,

    // Comment rows
    /// Author name in a comment header.
    pub author: Color,
    /// Comment body text.
    pub text: Color,
    /// Timestamps and reply counts.
    pub muted: Color,
    /// Marker for an unseen top-level comment.
    pub unseen_root: Color,
    /// Marker for a comment whose reply is unseen.
    pub unseen_reply: Color,
    /// Background of the row holding the traversal focus.
    pub focus_bg: Color,
    /// Skeleton rows drawn while scrolling fast.
    pub placeholder: Color,

    // Deferred block and reveal gate
    pub deferred_header: Color,
    pub deferred_text: Color,
    pub gate: Color,
    /// Gate control while a page is loading and it cannot be used.
    pub gate_disabled: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode: Color,
    pub status_loading: Color,
    pub status_error: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    ///
    /// Works on all terminals: 16-color, 256-color, and truecolor.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            author: Color::Cyan,
            text: Color::Reset,
            muted: Color::DarkGray,
            unseen_root: Color::Yellow,
            unseen_reply: Color::Blue,
            focus_bg: Color::Black,
            placeholder: Color::DarkGray,

            deferred_header: Color::Green,
            deferred_text: Color::Reset,
            gate: Color::Magenta,
            gate_disabled: Color::DarkGray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode: Color::Cyan,
            status_loading: Color::Yellow,
            status_error: Color::Red,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        // Catppuccin Mocha palette (selected subset)
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let blue = Color::Rgb(137, 180, 250);     // #89b4fa
        let mauve = Color::Rgb(203, 166, 247);    // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68);    // #313244
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4
        let peach = Color::Rgb(250, 179, 135);    // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            author: blue,
            text,
            muted: overlay1,
            unseen_root: peach,
            unseen_reply: yellow,
            focus_bg: surface0,
            placeholder: surface1,

            deferred_header: green,
            deferred_text: text,
            gate: mauve,
            gate_disabled: overlay0,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode: lavender,
            status_loading: yellow,
            status_error: red,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
