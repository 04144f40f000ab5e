// src/main.rs
//! Terminal bootstrap and main event loop.

use std::{
    fs,
    io,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use resona::{app::App, config::Config};

fn main() -> Result<()> {
    init_logging();
    let config = Config::load().sanitized();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app = App::new(&config)?;
    let result = run(&mut terminal, app, Duration::from_millis(config.ui.tick_ms));

    // Restore the terminal before reporting any error.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// The alternate screen owns stdout, so logs go to a file under the
/// local data directory. Logging is best-effort: without a writable
/// location the player simply runs unlogged.
fn init_logging() {
    let Some(dir) = dirs::data_local_dir().map(|d| d.join("resona")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::File::create(dir.join("resona.log")) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| app.draw(f))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_default();
        if event::poll(timeout)? {
            match event::read()? {
                CEvent::Key(key) => {
                    if app.on_key(key) {
                        return Ok(());
                    }
                }
                CEvent::Resize(width, height) => {
                    app.on_resize(width, height);
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            app.on_tick();
        }
    }
}
