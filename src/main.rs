use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, path::PathBuf, time::Duration};

use term_grid::app::{App, Config};
use term_grid::{grid, ui};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal spreadsheet grid with a global search palette", long_about = None)]
struct Args {
    /// Number of columns the grid starts with
    #[arg(long, default_value_t = grid::DEFAULT_COLUMNS as u32, value_parser = clap::value_parser!(u32).range(1..=16384))]
    columns: u32,

    /// Number of rows the grid starts with
    #[arg(long, default_value_t = grid::DEFAULT_ROWS, value_parser = clap::value_parser!(u32).range(1..))]
    rows: u32,

    /// Start with an empty sheet instead of the sample report
    #[arg(long)]
    blank: bool,

    /// Keep cut/copy/paste inside the app; never touch the system clipboard
    #[arg(long)]
    no_system_clipboard: bool,

    /// Directory for log files (defaults to the system temp directory)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log specification, e.g. "debug" or "info, term_grid::sheet=trace"; RUST_LOG wins if set
    #[arg(long, value_name = "SPEC", default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            columns: self.columns as usize,
            rows: self.rows,
            sample_data: !self.blank,
            system_clipboard: !self.no_system_clipboard,
        }
    }
}

/// Logs go to a rotating file; the terminal belongs to the UI.
fn start_logger(args: &Args) -> Result<LoggerHandle> {
    let log_dir = args.log_dir.clone().unwrap_or_else(|| std::env::temp_dir().join("term-grid"));
    let handle = Logger::try_with_env_or_str(&args.log_level)?
        .log_to_file(FileSpec::default().directory(&log_dir).basename("term-grid").suffix("log"))
        .rotate(
            Criterion::Size(64 * 1024),
            Naming::Numbers,
            Cleanup::KeepLogFiles(3),
        )
        .start()?;
    Ok(handle)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _logger = match start_logger(&args) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to start logging: {err}");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(args.config());

    // Run app loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{err:?}");
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if crossterm::event::poll(Duration::from_millis(250))? {
            match crossterm::event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }
        app.on_tick();

        if app.should_quit {
            log::info!("quit");
            return Ok(());
        }
    }
}
