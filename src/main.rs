use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod client;
mod controller;
mod domain;
mod export;
mod inputter;
mod model;
mod refine;
mod table;
mod ui;

use controller::Controller;
use domain::{Config, Message, XrevError};
use model::{Model, SessionState, Status};

/// Review, refine and export AI extracted attribute tables.
#[derive(Parser, Debug)]
#[command(name = "xrev", version, about)]
struct Cli {
    /// Session file from the upload step: {"filename", "columns", "rows"}
    session: Option<String>,

    /// Base url of the extraction backend
    #[arg(long, default_value = "http://localhost:5000")]
    backend: String,

    /// Name shown in the header bar
    #[arg(long, default_value = "User")]
    user: String,

    /// Directory export files are written into
    #[arg(long, default_value = ".")]
    output_dir: String,

    /// Log file, filtered through the XREV_LOG environment variable
    #[arg(long, default_value = "xrev.log")]
    log_file: String,

    /// Crossterm event poll timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(&cli.log_file) {
        eprintln!("Error: could not open log file {}: {e}", cli.log_file);
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run(cli: Cli) -> Result<(), XrevError> {
    info!("Starting xrev");
    let session = load_session(cli.session.as_deref());
    let config = Config::default()
        .with_backend_url(cli.backend)
        .with_user(cli.user)
        .with_output_dir(expand(&cli.output_dir))
        .with_event_poll_time(cli.poll_ms);

    let mut model = Model::init(config.clone(), session);
    let controller = Controller::new(&config);
    let mut terminal = ratatui::init();

    let size = terminal.size()?;
    model.update(Message::Resize(size.width, size.height))?;

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|frame| ui::draw(&model, frame))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}

fn init_tracing(log_file: &str) -> Result<(), std::io::Error> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(expand(log_file))?;
    let filter = EnvFilter::try_from_env("XREV_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .init();
    Ok(())
}

fn load_session(path: Option<&str>) -> SessionState {
    let Some(path) = path else {
        return SessionState::default();
    };
    let path = PathBuf::from(expand(path));
    match SessionState::load(&path) {
        Ok(session) => session,
        Err(e) => {
            warn!("Could not read session file {}: {e}", path.display());
            SessionState::default()
        }
    }
}

fn expand(path: &str) -> String {
    shellexpand::full(path)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
