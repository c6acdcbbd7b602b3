use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::{Context, Result};
use clap::Parser;
use ferret_core::{Config, PreferenceStore, Transcript};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod commands;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

/// Terminal chat client for a local /chat endpoint
#[derive(Parser, Debug)]
#[command(name = "ferret", version, about)]
struct Args {
    /// Chat endpoint URL (overrides the config file)
    #[arg(short, long, env = "FERRET_ENDPOINT")]
    endpoint: Option<String>,

    /// Per-character delay in milliseconds for whole (non-streamed) replies
    #[arg(long, value_name = "MS")]
    typing_delay: Option<u64>,

    /// Don't write the dated transcript files
    #[arg(long)]
    no_transcript: bool,

    /// Read settings from this file instead of the default config path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective settings to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose (trace) logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Config {
    let loaded = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: using default settings: {e:#}");
        Config::new()
    });

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(delay) = args.typing_delay {
        config.typing_delay_ms = delay;
    }
    if args.no_transcript {
        config.transcript = false;
    }
    config
}

/// Log to `<log_dir>/ferret.log`; the terminal belongs to the TUI
fn init_logging(args: &Args, log_dir: &Path) -> Result<()> {
    let default_filter = if args.verbose {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fs::create_dir_all(log_dir)
        .with_context(|| format!("creating {}", log_dir.display()))?;
    let log_path = log_dir.join("ferret.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args);

    if args.write_config {
        let path = match &args.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => {
                config.save()?;
                Config::get_config_path()?
            }
        };
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let log_dir = match config.resolved_log_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("Warning: no log directory: {e:#}");
            None
        }
    };
    if let Some(dir) = &log_dir {
        if let Err(e) = init_logging(&args, dir) {
            eprintln!("Warning: logging disabled: {e:#}");
        }
    }
    tracing::info!(endpoint = %config.endpoint, "Starting ferret");

    let preferences = match PreferenceStore::default_path() {
        Ok(path) => PreferenceStore::open_or_empty(path),
        Err(e) => {
            tracing::warn!("Keeping preferences in the temp dir: {e:#}");
            PreferenceStore::open_or_empty(std::env::temp_dir().join("ferret-preferences.json"))
        }
    };

    let transcript = match (&log_dir, config.transcript) {
        (Some(dir), true) => Some(Transcript::new(dir.clone())),
        _ => None,
    };
    tracing::debug!(
        preferences = %preferences.path().display(),
        transcripts = ?transcript.as_ref().map(|t| t.dir().display().to_string()),
        "Storage locations"
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(&config, preferences, transcript, events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("Exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
