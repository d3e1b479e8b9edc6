//! Stream configuration loaded from `config.toml`.
//!
//! Every constant the windowing, pagination, and reveal policies reference lives
//! in [`StreamConfig`]. The file is optional; a missing file yields defaults.
//!
//! ```toml
//! theme = "catppuccin-mocha"
//!
//! [stream]
//! initial_render_threshold = 20
//! overscan_rows = 3
//! placeholder_enter_velocity = 300.0
//! page_size = 10
//! view_mode = "oldest-first"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::types::SortOrder;

/// Display order of the stream.
///
/// `OldestFirst` is the alternate chronological mode: newly arrived comments
/// are deferred instead of spliced into the rendered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl ViewMode {
    /// Whether the deferred-insert queue is active in this mode.
    pub fn is_alternate(self) -> bool {
        self == ViewMode::OldestFirst
    }

    pub fn sort_order(self) -> SortOrder {
        match self {
            ViewMode::NewestFirst => SortOrder::NewestFirst,
            ViewMode::OldestFirst => SortOrder::OldestFirst,
        }
    }
}

/// Fixed policy constants for one stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Items rendered while the reveal gate is closed (K).
    pub initial_render_threshold: usize,
    /// Items rendered beyond each edge of the viewport.
    pub overscan_rows: usize,
    /// Scroll speed, in rows per second, at which rows switch to placeholders.
    pub placeholder_enter_velocity: f32,
    /// Top-level comments requested per page.
    pub page_size: usize,
    pub view_mode: ViewMode,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_render_threshold: 20,
            overscan_rows: 3,
            placeholder_enter_velocity: 300.0,
            page_size: 10,
            view_mode: ViewMode::default(),
        }
    }
}

impl StreamConfig {
    /// Rejects values the policies cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a zero page size, a zero render
    /// threshold, or a velocity threshold that is not a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_render_threshold == 0 {
            return Err(ConfigError::Invalid(
                "initial_render_threshold must be at least 1".to_owned(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_owned()));
        }
        let v = self.placeholder_enter_velocity;
        if !v.is_finite() || v <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "placeholder_enter_velocity must be positive, got {v}"
            )));
        }
        Ok(())
    }
}

/// Top-level contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Theme name resolved by the binary.
    pub theme: String,
    pub stream: StreamConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            stream: StreamConfig::default(),
        }
    }
}

impl Settings {
    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML or unknown keys and
    /// `ConfigError::Invalid` when validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(raw)?;
        settings.stream.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path`. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` for unreadable files and the errors of
    /// [`Settings::from_toml_str`] for bad contents.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`Settings::load`] but never fails: problems are logged and the
    /// defaults are used instead.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "config rejected, using defaults");
            Self::default()
        })
    }
}
