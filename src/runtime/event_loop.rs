use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::audio::MediaBackend;
use crate::config;
use crate::controller::{Controller, NowPlaying};
use crate::mpris::ControlCmd;
use crate::ui;

/// Upper bound on how long we block waiting for input, so remote commands
/// from MPRIS are picked up promptly.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Map a key press to a transport command.
pub fn command_for(key: &KeyEvent, controls: &config::ControlsSettings) -> Option<ControlCmd> {
    let scrub = Duration::from_secs(controls.scrub_seconds);

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(ControlCmd::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(ControlCmd::PlayPause),
        KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Right => Some(ControlCmd::Next),
        KeyCode::Char('h') | KeyCode::Left => Some(ControlCmd::Prev),
        KeyCode::Char('L') => Some(ControlCmd::SeekForward(scrub)),
        KeyCode::Char('H') => Some(ControlCmd::SeekBackward(scrub)),
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0) as u8;
            Some(ControlCmd::SeekPercent(tenth * 10))
        }
        KeyCode::Char('s') => Some(ControlCmd::Stop),
        KeyCode::Char('q') | KeyCode::Esc => Some(ControlCmd::Quit),
        _ => None,
    }
}

/// Main terminal event loop: draws, applies remote and keyboard commands and
/// drives the playback clock. Returns `Ok(())` when shutdown is requested.
pub fn run<B: MediaBackend, N: NowPlaying>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    controller: &mut Controller<B, N>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, controller.app(), &settings.ui, &settings.controls))?;

        // Commands coming from MPRIS.
        while let Ok(cmd) = control_rx.try_recv() {
            if controller.handle(cmd, Instant::now()) {
                return Ok(());
            }
        }

        let timeout = controller.poll_timeout(Instant::now(), INPUT_POLL);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Releases and repeats are ignored.
                let cmd = (key.kind == KeyEventKind::Press)
                    .then(|| command_for(&key, &settings.controls))
                    .flatten();
                if let Some(cmd) = cmd {
                    if controller.handle(cmd, Instant::now()) {
                        return Ok(());
                    }
                }
            }
        }

        controller.on_tick(Instant::now());
    }
}
