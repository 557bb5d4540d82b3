//! Todo TUI
//!
//! Terminal front end for the todo list. Talks to the server when it can
//! and keeps working from the local cache when it cannot.

mod app;
mod keybindings;
mod mode;
mod palette;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use todo_core::{FileStorage, HttpRemoteStore, Reconciler, RemoteStore, SlotStorage, TodoConfig};

use app::App;

const LOG_FILE: &str = "todo-tui.log";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TodoConfig::load()?;
    let data_dir = config.client.resolved_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // Setup logging; stdout belongs to the terminal
    init_logging(&data_dir)?;
    tracing::info!(server = %config.client.server_url, "Starting todo TUI");

    let storage = FileStorage::open(&data_dir)?;
    let remote = HttpRemoteStore::from_config(&config.client)?;
    let mut app = App::new(Reconciler::new(remote, storage))?;
    app.load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Terminal error: {}", err);
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn init_logging(data_dir: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_app<B, R, S>(terminal: &mut Terminal<B>, app: &mut App<R, S>) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    R: RemoteStore,
    S: SlotStorage,
{
    loop {
        terminal.draw(|f| app.render(f))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key.code, key.modifiers) {
                return Ok(());
            }
        }
    }
}
