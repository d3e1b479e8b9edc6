use std::io::Write;

use pretty_assertions::assert_eq;
use threadview_core::config::{Settings, StreamConfig, ViewMode};
use threadview_core::error::ConfigError;
use threadview_core::types::SortOrder;

#[test]
fn empty_file_yields_defaults() {
    let settings = Settings::from_toml_str("").unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.stream.initial_render_threshold, 20);
    assert_eq!(settings.stream.page_size, 10);
}

#[test]
fn partial_stream_table_keeps_other_defaults() {
    let settings = Settings::from_toml_str(
        r#"
        theme = "dark"

        [stream]
        page_size = 25
        view_mode = "oldest-first"
        "#,
    )
    .unwrap();
    assert_eq!(settings.theme, "dark");
    assert_eq!(
        settings.stream,
        StreamConfig { page_size: 25, view_mode: ViewMode::OldestFirst, ..StreamConfig::default() }
    );
    assert!(settings.stream.view_mode.is_alternate());
    assert_eq!(settings.stream.view_mode.sort_order(), SortOrder::OldestFirst);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Settings::from_toml_str("[stream]\nbogus = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn zero_values_fail_validation() {
    for raw in [
        "[stream]\npage_size = 0\n",
        "[stream]\ninitial_render_threshold = 0\n",
        "[stream]\nplaceholder_enter_velocity = 0.0\n",
        "[stream]\nplaceholder_enter_velocity = -5.0\n",
    ] {
        let err = Settings::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{raw} should be invalid");
    }
}

#[test]
fn missing_file_is_not_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn bad_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[stream]\npage_size = \"ten\"").unwrap();
    assert!(Settings::load(file.path()).is_err());
    assert_eq!(Settings::load_or_default(file.path()), Settings::default());
}
