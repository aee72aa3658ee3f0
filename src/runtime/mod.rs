use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::catalog::{Catalog, Playlist};
use crate::controller::{Controller, ControllerOptions};
use crate::mpris::ControlCmd;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let arg = env::args().nth(1);
    let (mut settings, settings_warning) = settings::load_settings();

    if arg.as_deref() == Some("--print-config") {
        if let Some(msg) = &settings_warning {
            eprintln!("encore: {msg}");
        }
        print!("{}", settings.to_toml()?);
        return Ok(());
    }
    if let Some(dir) = arg {
        settings.catalog.bundle_dir = PathBuf::from(dir);
    }

    match logging::init(&settings.logging) {
        Ok(path) => info!(log = %path.display(), "encore starting"),
        Err(e) => eprintln!("encore: logging disabled: {e}"),
    }
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let catalog = Catalog::from_settings(&settings.catalog);
    let playlist = Playlist::new(catalog.list_tracks()).inspect_err(|e| {
        error!(dir = %settings.catalog.bundle_dir.display(), error = %e, "no tracks");
    })?;
    info!(tracks = playlist.len(), "playlist ready");

    let player = AudioPlayer::new(&settings.audio).inspect_err(|e| {
        error!(error = %e, "no audio output");
    })?;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    let options = ControllerOptions::from_settings(&settings);
    let artwork_dir = options.artwork_dir.clone();
    let mut controller = Controller::new(App::new(playlist), player, mpris, options);
    controller.start(Instant::now());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut controller, &control_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(dir) = artwork_dir {
        // Only present when a track carried embedded artwork.
        let _ = std::fs::remove_dir_all(dir);
    }
    if let Err(e) = &run_result {
        error!(error = %e, "event loop failed");
    }
    info!("encore stopped");
    run_result
}
