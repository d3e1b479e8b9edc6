//! threadview, a terminal viewer for a paginated, threaded comment stream.
//!
//! Entry point for the `threadview` binary. Wires together the terminal
//! lifecycle (`tui`), the unified event bus (`event`), background page loads
//! (`loader`), the stream UI (`ui`), the theme system (`theme`), and the
//! WAL-mode SQLite comment store (`threadview-core`).
//!
//! # Startup sequence
//!
//! 1. Parse arguments and start file logging. The terminal belongs to the UI,
//!    so logs never go to stderr.
//! 2. Load settings from XDG config; problems fall back to defaults.
//! 3. Open the store, seed it when asked, and take the mount snapshot.
//! 4. `install_panic_hook()`, then `register_sigterm()`.
//! 5. `init_tui()`, spawn the event task, request the first page.
//!
//! `restore_tui()` is called after the event loop exits. Nothing inside the
//! loop uses `?`; a draw error leaves via `break` and is returned once the
//! terminal is restored.

mod app;
mod event;
mod loader;
mod scroll;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use threadview_core::config::{Settings, ViewMode};
use threadview_core::db;

use crate::ui::keybindings::{KeyAction, handle_key, handle_mouse};

#[derive(Debug, Parser)]
#[command(name = "threadview", version, about = "Browse a threaded comment stream")]
struct Args {
    /// Path to the comment store.
    #[arg(long, default_value = ".threadview/comments.db")]
    db: PathBuf,

    /// Insert N demo threads when the store is empty.
    #[arg(long, value_name = "N")]
    seed: Option<usize>,

    /// Show the oldest comments first and hold new arrivals in a separate block.
    #[arg(long)]
    oldest_first: bool,

    /// Config file to read instead of the XDG default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the daily `threadview.log` files.
    #[arg(long, default_value = ".threadview")]
    log_dir: PathBuf,
}

/// Returns the path to the threadview config file.
///
/// Prefers `$XDG_CONFIG_HOME/threadview/config.toml`; falls back to
/// `~/.config/threadview/config.toml` when the env var is absent.
fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("threadview").join("config.toml")
}

/// Routes `tracing` output to a daily file `<dir>/threadview.log.<date>`.
///
/// `RUST_LOG` overrides the default `info` filter. The returned guard flushes
/// the writer on drop and must live until exit.
fn init_logging(dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, "threadview.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(guard)
}

fn io_err(e: impl std::error::Error + Send + Sync + 'static) -> std::io::Error {
    std::io::Error::other(e)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args.log_dir)?;

    let settings = Settings::load_or_default(&args.config.clone().unwrap_or_else(config_path));
    let mut stream_config = settings.stream;
    if args.oldest_first {
        stream_config.view_mode = ViewMode::OldestFirst;
    }
    let theme = theme::Theme::from_name(&settings.theme);

    if let Some(parent) = args.db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = db::open_db(&args.db.to_string_lossy()).await.map_err(io_err)?;
    if let Some(roots) = args.seed {
        if db::count_top_level(&conn).await.map_err(io_err)? == 0 {
            let inserted = db::seed_demo(&conn, roots, db::now_secs()).await.map_err(io_err)?;
            info!(inserted, "seeded demo threads");
        }
    }
    let snapshot = db::now_secs();
    info!(
        db = %args.db.display(),
        view_mode = ?stream_config.view_mode,
        snapshot,
        "mounting stream"
    );

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let mut state = app::AppState::new(stream_config, conn, handler.tx.clone(), snapshot);
    state.start();

    let mut draw_result: std::io::Result<()> = Ok(());

    // Exits only via `break`, so `restore_tui()` below is always reached.
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when no
            // events arrive.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Render) => {
                        // Exactly one draw() call per Render event.
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            draw_result = Err(e);
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Mouse(mouse)) => handle_mouse(mouse, &mut state),
                    Some(event::AppEvent::Tick) => state.on_tick(),
                    Some(event::AppEvent::PageLoaded(payload)) => state.apply_page(*payload),
                    Some(event::AppEvent::Arrivals(payload)) => state.apply_arrivals(*payload),
                    Some(event::AppEvent::Resize(rows)) => {
                        state.set_viewport(ui::viewport_items(rows));
                    }
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    if let Err(e) = &draw_result {
        error!(%e, "draw failed");
    }
    state.stream.unmount();
    draw_result
}
