//! Application model types: `App` and `PlayerEvent`.
//!
//! `App` holds the playlist cursor, the playing flag, elapsed/duration and
//! the derived display strings. It never talks to audio itself; whoever
//! subscribes reacts to the events it emits.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::audio::SongInfo;
use crate::catalog::{Playlist, Track};

use super::format::format_duration_label;

/// Change notifications published by [`App`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The playing flag flipped to the given value.
    PlayingChanged(bool),
    /// The cursor moved (or restarted) to `index`. `resume` records whether
    /// playback was active right before the change.
    TrackChanged { index: usize, resume: bool },
    /// The current track finished loading with this duration.
    TrackLoaded { duration: Duration },
    /// The current track could not be loaded.
    TrackFailed,
    /// Elapsed time was updated by a clock tick or a seek.
    ElapsedChanged(Duration),
}

/// The main application model.
pub struct App {
    playlist: Playlist,
    index: usize,
    playing: bool,
    loaded: bool,
    elapsed: Duration,
    duration: Duration,
    elapsed_label: String,
    duration_label: String,
    song: SongInfo,
    subscribers: Vec<Sender<PlayerEvent>>,
}

impl App {
    /// Create a new `App` positioned on the first track, paused.
    pub fn new(playlist: Playlist) -> Self {
        Self {
            playlist,
            index: 0,
            playing: false,
            loaded: false,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            elapsed_label: format_duration_label(Duration::ZERO),
            duration_label: format_duration_label(Duration::ZERO),
            song: SongInfo::placeholder(),
            subscribers: Vec::new(),
        }
    }

    /// Register a new listener; it receives every event emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: PlayerEvent) {
        // Listeners that hung up are dropped.
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn refresh_labels(&mut self) {
        self.elapsed_label = format_duration_label(self.elapsed);
        self.duration_label = format_duration_label(self.duration);
    }

    fn set_playing(&mut self, playing: bool) {
        if self.playing != playing {
            self.playing = playing;
            self.emit(PlayerEvent::PlayingChanged(playing));
        }
    }

    /// Flip the playing flag.
    pub fn toggle(&mut self) {
        self.set_playing(!self.playing);
    }

    /// Set playing; no event when already playing.
    pub fn play(&mut self) {
        self.set_playing(true);
    }

    /// Clear playing; no event when already paused.
    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    /// Move to the next track, wrapping to the first after the last.
    pub fn advance(&mut self) {
        let next = self.playlist.next_index(self.index);
        self.change_track(next);
    }

    /// Move to the previous track; on the first track this restarts it.
    pub fn rewind(&mut self) {
        let prev = self.playlist.prev_index(self.index);
        self.change_track(prev);
    }

    fn change_track(&mut self, index: usize) {
        let resume = self.playing;
        self.set_playing(false);

        self.index = index;
        self.loaded = false;
        self.elapsed = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.song = SongInfo::placeholder();
        self.refresh_labels();

        self.emit(PlayerEvent::TrackChanged { index, resume });
    }

    /// Clock tick: take `current` as elapsed time, but only while playing.
    pub fn tick(&mut self, current: Duration) {
        if !self.playing {
            return;
        }
        self.elapsed = current.min(self.duration);
        self.refresh_labels();
        self.emit(PlayerEvent::ElapsedChanged(self.elapsed));
    }

    /// User scrub: set elapsed regardless of the playing flag.
    pub fn seek(&mut self, value: Duration) {
        self.elapsed = value.min(self.duration);
        self.refresh_labels();
        self.emit(PlayerEvent::ElapsedChanged(self.elapsed));
    }

    /// Record what the media backend reported for the current track.
    pub fn track_loaded(&mut self, duration: Duration, song: SongInfo) {
        self.loaded = true;
        self.duration = duration;
        self.elapsed = self.elapsed.min(duration);
        self.song = song;
        self.refresh_labels();
        self.emit(PlayerEvent::TrackLoaded { duration });
    }

    /// The current track could not be loaded: stay paused at zero with
    /// placeholder metadata.
    pub fn track_failed(&mut self) {
        self.set_playing(false);
        self.loaded = false;
        self.elapsed = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.song = SongInfo::placeholder();
        self.refresh_labels();
        self.emit(PlayerEvent::TrackFailed);
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_track(&self) -> &Track {
        self.playlist.get(self.index)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the current track is loaded in the backend.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed_label(&self) -> &str {
        &self.elapsed_label
    }

    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }

    pub fn song(&self) -> &SongInfo {
        &self.song
    }

    /// Elapsed as a fraction of duration in `0.0..=1.0` (0 when unknown).
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}
