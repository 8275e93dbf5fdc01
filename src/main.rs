//! # passdeck Entry Point
//!
//! A terminal front-end for `pass`, the standard unix password manager.
//!
//! ## Usage
//!
//! ```bash
//! # Start with the saved settings
//! passdeck
//!
//! # Use another settings file
//! passdeck --config ./settings.json
//!
//! # Print the resolved settings and exit
//! passdeck --debug
//!
//! # Write diagnostics to a file (filter with PASSDECK_LOG=debug)
//! passdeck --log-file /tmp/passdeck.log
//! ```
//!
//! ## Start-up
//!
//! 1. **Settings**: load the settings file, defaulting the store to
//!    `~/.password-store/`
//! 2. **Discovery**: look up `pass`, `git` and `gpg2`/`gpg` for every path that
//!    is still empty, saving what was found
//! 3. **UI**: show the store tree; if no usable tools were found the settings
//!    dialog opens straight away
//!
//! Key bindings are listed in [`passdeck::ui::input`].

use passdeck::clipboard;
use passdeck::config::SettingsStore;
use passdeck::logging;
use passdeck::resolver::{self, Resolution, WhichProbe};
use passdeck::ui::{self, input, theme::Theme, App};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// passdeck - a terminal front-end for pass
#[derive(Parser, Debug)]
#[command(name = "passdeck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse a password store and copy secrets to the clipboard", long_about = None)]
struct Args {
    /// Settings file to use instead of the platform default
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the resolved settings and exit
    #[arg(long)]
    debug: bool,

    /// Append diagnostic logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    let _ = panic::take_hook();

    result
}

/// Load settings, fill in defaults and discovered executables, and persist
/// whatever changed.
fn prepare_settings(config: Option<PathBuf>) -> Result<(SettingsStore, Resolution)> {
    let mut store = match config {
        Some(path) => SettingsStore::open(path),
        None => SettingsStore::open_default()?,
    };

    let mut settings = store.settings().clone();
    let store_defaulted = settings.ensure_store_path();
    let resolution = resolver::resolve_missing(&mut settings, &WhichProbe);

    if store_defaulted || resolution.changed {
        if let Err(e) = store.replace(settings) {
            warn!("failed to save settings: {:#}", e);
            eprintln!("Warning: Could not save settings: {:#}", e);
        }
    }

    Ok((store, resolution))
}

async fn run_application(args: Args) -> Result<()> {
    if let Some(ref path) = args.log_file {
        logging::init_file_logging(path)?;
    }

    let (store, resolution) = prepare_settings(args.config)?;
    info!("using settings at {}", store.path().display());

    if args.debug {
        println!("=== Settings ({}) ===", store.path().display());
        println!(
            "{}",
            serde_json::to_string_pretty(store.settings()).context("Failed to serialize settings")?
        );
        println!("\nNeeds manual configuration: {}", resolution.needs_manual_config);
        return Ok(());
    }

    let theme = Theme::detect();
    info!("using theme {}", theme.name);
    let mut app = App::new(store, clipboard::backend::detect(), theme.clone())?;
    if resolution.needs_manual_config {
        app.open_settings();
    }

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(&mut terminal, &mut app, &mut event_reader);

    // Restore terminal (always runs, even if run_app failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    run_result?;
    cleanup_result?;

    Ok(())
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_reader: &mut dyn EventReader,
) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw terminal UI")?;

        // Poll faster while a process is streaming output
        let poll_timeout = if app.is_busy() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        if let Some(Event::Key(key)) = event_reader.read_event(poll_timeout)? {
            input::handle_key(app, key, Instant::now());
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
