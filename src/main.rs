//! `boxlab-replay`: run a recorded message stream against a project without
//! a display and write the resulting project.
//!
//! ```text
//! boxlab-replay <project.json> <events.json> [out.json]
//! ```
//!
//! Without `out.json` the result is printed to stdout. Messages that fail
//! are logged and skipped, like a UI would after reporting them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use boxlab::format::{AutoSaveManager, FormatError, json};
use boxlab::render::RecordingSurface;
use boxlab::{AppConfig, BoardController, Message};

struct Args {
    project: PathBuf,
    events: PathBuf,
    output: Option<PathBuf>,
}

impl Args {
    fn parse() -> Option<Self> {
        let mut args = std::env::args_os().skip(1);
        let project = args.next()?.into();
        let events = args.next()?.into();
        let output = args.next().map(PathBuf::from);
        if args.next().is_some() {
            return None;
        }
        Some(Self {
            project,
            events,
            output,
        })
    }
}

fn main() -> ExitCode {
    let config = AppConfig::load_from_default_path().unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let Some(args) = Args::parse() else {
        eprintln!("usage: boxlab-replay <project.json> <events.json> [out.json]");
        return ExitCode::from(2);
    };

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Replay error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_events(path: &Path) -> Result<Vec<Message>, FormatError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn run(config: &AppConfig, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let project = json::load(&args.project)?;
    let events = load_events(&args.events)?;
    log::info!("Replaying {} message(s) from {:?}", events.len(), args.events);

    let surface = RecordingSurface::with_style(config.surface.clone());
    let mut board = BoardController::new(config, project, surface)?
        .with_auto_save(AutoSaveManager::disabled());
    if let Some(output) = &args.output {
        board = board.with_save_path(output.clone());
    }

    if !board.project().images.is_empty() {
        board.open(0)?;
    }

    let mut failed = 0usize;
    for (index, message) in events.into_iter().enumerate() {
        if let Err(e) = board.update(message) {
            failed += 1;
            log::warn!("Message {} rejected: {}", index, e);
        }
    }

    let payload = board.to_payload();
    log::info!(
        "Replay finished: {} annotation(s), {} frame(s) drawn, {} message(s) rejected",
        payload.total_annotations(),
        board.engine().surface().frames(),
        failed
    );

    match &args.output {
        Some(_) => board.save()?,
        None => println!("{}", String::from_utf8_lossy(&json::to_bytes(&payload)?)),
    }
    Ok(())
}
