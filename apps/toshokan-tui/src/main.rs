//! Toshokan - personal paper library
//!
//! Terminal UI over toshokan-core, plus a few non-interactive subcommands.

mod app;
mod cli;
mod keybindings;
mod launcher;
mod widgets;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use app::{App, AppAction};
use cli::Cli;
use launcher::Launcher;
use toshokan_core::{JsonCatalogStore, Session};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.log_file.clone()) {
        eprintln!("Error: cannot open log file: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "toshokan failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config()?;
    let store = Box::new(JsonCatalogStore::new(&config.paths.catalog));
    let (session, report) = Session::open(config, store)?;
    for file in &report.placeholders {
        tracing::warn!(file = %file, "non-canonical filename, added placeholder entry");
    }

    match cli.command {
        Some(command) => cli::run_command(session, command, cli.export_path),
        None => run_tui(session, report.placeholders.len(), cli.export_path),
    }
}

/// Log to a file so the terminal UI stays intact.
fn init_logging(log_file: Option<PathBuf>) -> io::Result<()> {
    let path = log_file
        .or_else(|| dirs::data_local_dir().map(|d| d.join("toshokan").join("toshokan.log")))
        .unwrap_or_else(|| PathBuf::from("toshokan.log"));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(
    session: Session,
    placeholders: usize,
    export_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let launcher = Launcher::new(session.config().apps.clone());
    let mut app = App::new(session, export_path);
    if placeholders > 0 {
        app.set_status(format!(
            "{placeholders} file(s) with non-canonical names added as placeholders"
        ));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &launcher);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    launcher: &Launcher,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key.code, key.modifiers) {
                AppAction::Quit => return Ok(()),
                AppAction::Launch { target, path } => {
                    if let Err(err) = launcher.open(terminal, target, &path) {
                        tracing::warn!(path = %path.display(), error = %err, "launch failed");
                        app.set_status(err.to_string());
                    }
                }
                AppAction::None => {}
            }
        }
    }
}
