//! Controller: wires the [`App`] state-holder to the outside world.
//!
//! It subscribes to the app's events and reacts to them: starting/pausing the
//! media backend, swapping tracks, running the playback clock and mirroring
//! everything to the now-playing surface. All of it happens on the UI thread.

mod artwork;
mod ticker;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::app::{App, PlayerEvent};
use crate::audio::{MediaBackend, SongInfo};
use crate::config::Settings;
use crate::mpris::ControlCmd;

pub use ticker::Ticker;

/// Snapshot mirrored to the OS "now playing" surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingInfo {
    pub index: usize,
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub art_url: Option<String>,
    pub length: Duration,
    pub elapsed: Duration,
    pub playing: bool,
    pub loaded: bool,
}

/// Receiver of now-playing snapshots.
pub trait NowPlaying {
    fn publish(&self, info: &NowPlayingInfo);
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub autoplay: bool,
    pub resume_on_track_change: bool,
    pub auto_advance: bool,
    pub tick_interval: Duration,
    pub quit_fade_out: Duration,
    /// Where embedded covers are written for `mpris:artUrl`; `None` disables it.
    pub artwork_dir: Option<PathBuf>,
}

impl ControllerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            autoplay: settings.playback.autoplay,
            resume_on_track_change: settings.playback.resume_on_track_change,
            auto_advance: settings.playback.auto_advance,
            tick_interval: Duration::from_millis(settings.ui.tick_ms),
            quit_fade_out: Duration::from_millis(settings.audio.quit_fade_out_ms),
            artwork_dir: Some(
                std::env::temp_dir().join(format!("encore-{}", std::process::id())),
            ),
        }
    }
}

pub struct Controller<B: MediaBackend, N: NowPlaying> {
    app: App,
    events: Receiver<PlayerEvent>,
    backend: B,
    now_playing: N,
    ticker: Ticker,
    options: ControllerOptions,
    art_url: Option<String>,
}

impl<B: MediaBackend, N: NowPlaying> Controller<B, N> {
    pub fn new(mut app: App, backend: B, now_playing: N, options: ControllerOptions) -> Self {
        let events = app.subscribe();
        Self {
            app,
            events,
            backend,
            now_playing,
            ticker: Ticker::new(options.tick_interval),
            options,
            art_url: None,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Load the initial track and optionally start playing it.
    pub fn start(&mut self, now: Instant) {
        self.load_current(false);
        if self.options.autoplay && self.app.is_loaded() {
            self.app.play();
        }
        self.dispatch(now);
    }

    /// Apply one control command. Returns `true` when the app should quit.
    pub fn handle(&mut self, cmd: ControlCmd, now: Instant) -> bool {
        debug!(?cmd, "control command");
        match cmd {
            ControlCmd::Quit => {
                info!("quit requested");
                self.ticker.stop();
                self.backend.shutdown(self.options.quit_fade_out);
                return true;
            }
            ControlCmd::PlayPause => {
                if self.app.is_playing() || self.playable() {
                    self.app.toggle();
                }
            }
            ControlCmd::Play => {
                if self.playable() {
                    self.app.play();
                }
            }
            ControlCmd::Pause => self.app.pause(),
            ControlCmd::Stop => {
                self.app.pause();
                self.seek_to(Duration::ZERO);
            }
            ControlCmd::Next => self.app.advance(),
            ControlCmd::Prev => self.app.rewind(),
            ControlCmd::SeekForward(by) => {
                let target = self.backend.position().saturating_add(by);
                self.seek_to(target);
            }
            ControlCmd::SeekBackward(by) => {
                let target = self.backend.position().saturating_sub(by);
                self.seek_to(target);
            }
            ControlCmd::SeekTo(to) => self.seek_to(to),
            ControlCmd::SeekPercent(pct) => {
                let fraction = f64::from(pct.min(100)) / 100.0;
                let target = self.app.duration().mul_f64(fraction);
                self.seek_to(target);
            }
        }
        self.dispatch(now);
        false
    }

    /// Drive the playback clock; call on every event-loop iteration.
    pub fn on_tick(&mut self, now: Instant) {
        if !self.ticker.poll(now) {
            return;
        }

        if self.app.is_playing() && self.backend.is_finished() {
            info!(track = %self.app.current_track().id, "track finished");
            if self.options.auto_advance {
                self.app.advance();
            } else {
                // A drained sink can't be replayed; reload so the track sits
                // ready at the start.
                self.app.pause();
                self.load_current(false);
                self.app.seek(Duration::ZERO);
            }
        } else {
            self.app.tick(self.backend.position());
        }
        self.dispatch(now);
    }

    /// How long the event loop may wait for input before the next tick is due.
    pub fn poll_timeout(&self, now: Instant, max: Duration) -> Duration {
        self.ticker
            .time_until(now)
            .map(|d| d.min(max))
            .unwrap_or(max)
    }

    pub fn now_playing_info(&self) -> NowPlayingInfo {
        let track = self.app.current_track();
        let song = self.app.song();
        NowPlayingInfo {
            index: self.app.index(),
            path: track.path.clone(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            art_url: self.art_url.clone(),
            length: self.app.duration(),
            elapsed: self.app.elapsed(),
            playing: self.app.is_playing(),
            loaded: self.app.is_loaded(),
        }
    }

    fn playable(&self) -> bool {
        if !self.app.is_loaded() {
            debug!(track = %self.app.current_track().id, "nothing loaded, ignoring play");
        }
        self.app.is_loaded()
    }

    fn seek_to(&mut self, target: Duration) {
        if !self.app.is_loaded() {
            return;
        }
        let target = target.min(self.app.duration());
        match self.backend.seek(target) {
            Ok(()) => self.app.seek(target),
            Err(e) => warn!(error = %e, "seek failed"),
        }
    }

    fn dispatch(&mut self, now: Instant) {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            changed = true;
            match event {
                PlayerEvent::PlayingChanged(true) => {
                    self.backend.play();
                    self.ticker.start(now);
                }
                PlayerEvent::PlayingChanged(false) => {
                    self.backend.pause();
                    self.ticker.stop();
                }
                PlayerEvent::TrackChanged { index, resume } => {
                    debug!(index, resume, "track changed");
                    self.load_current(resume);
                }
                PlayerEvent::TrackLoaded { duration } => {
                    debug!(secs = duration.as_secs(), "track ready");
                }
                PlayerEvent::TrackFailed | PlayerEvent::ElapsedChanged(_) => {}
            }
        }

        if changed {
            self.now_playing.publish(&self.now_playing_info());
        }
    }

    fn load_current(&mut self, resume: bool) {
        let track = self.app.current_track().clone();
        match self.backend.load(&track.path) {
            Ok(loaded) => {
                self.art_url = self.persist_artwork(&loaded.info);
                self.app.track_loaded(loaded.duration, loaded.info);
                if resume && self.options.resume_on_track_change {
                    self.app.play();
                }
            }
            Err(e) => {
                warn!(track = %track.id, error = %e, "failed to load track");
                self.art_url = None;
                self.app.track_failed();
            }
        }
    }

    fn persist_artwork(&self, info: &SongInfo) -> Option<String> {
        let dir = self.options.artwork_dir.as_deref()?;
        let art = info.artwork.as_ref()?;
        match artwork::persist_artwork(dir, self.app.index(), art) {
            Ok(path) => Some(artwork::file_url(&path)),
            Err(e) => {
                warn!(error = %e, "failed to write artwork");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
