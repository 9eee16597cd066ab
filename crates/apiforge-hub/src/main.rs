mod app;
mod demo_seed;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use apiforge_core::{config::Config, db, logging};
use apiforge_editor::{ActionEditorTool, EditorOptions};

use app::App;

fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init(&config)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting apiforge");

    // Open the shared database
    let conn = db::open_db()?;
    if config.seed_demo {
        demo_seed::seed_demo_data(&conn)?;
    }

    // The tool gets its own connection to avoid borrow issues
    let editor_conn = db::open_db()?;
    let editor = ActionEditorTool::new(editor_conn, EditorOptions::from_config(&config))?;

    let mut app = App::new(vec![Box::new(editor)]);
    app.init_db(&conn)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "event loop failed");
        eprintln!("Error: {err:?}");
    }
    tracing::info!("bye");

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(50);

    loop {
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(TICK_RATE)? {
            let ev = event::read()?;
            app.handle_event(ev);
        }

        app.tick();
    }
}
