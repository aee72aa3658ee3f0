use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::*;
use crate::audio::{Artwork, AudioError, LoadedTrack, MediaBackend, SongInfo};
use crate::catalog::{Playlist, Track};

#[derive(Debug, Default)]
struct FakeState {
    loads: Vec<PathBuf>,
    broken: Vec<PathBuf>,
    playing: bool,
    position: Duration,
    finished: bool,
    seeks: Vec<Duration>,
    fail_seek: bool,
    shutdown: Option<Duration>,
    artwork: Option<Artwork>,
}

#[derive(Clone, Default)]
struct FakeBackend(Rc<RefCell<FakeState>>);

impl MediaBackend for FakeBackend {
    fn load(&mut self, path: &Path) -> Result<LoadedTrack, AudioError> {
        let mut s = self.0.borrow_mut();
        s.loads.push(path.to_path_buf());
        s.playing = false;
        s.position = Duration::ZERO;
        s.finished = false;
        if s.broken.iter().any(|p| p == path) {
            return Err(AudioError::Open {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "missing"),
            });
        }
        let title = path.file_stem().unwrap().to_string_lossy().to_string();
        Ok(LoadedTrack {
            duration: Duration::from_secs(180),
            info: SongInfo {
                title,
                artist: "Fake Artist".to_string(),
                artwork: s.artwork.clone(),
            },
        })
    }

    fn play(&mut self) {
        self.0.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }

    fn seek(&mut self, to: Duration) -> Result<(), AudioError> {
        let mut s = self.0.borrow_mut();
        if s.fail_seek {
            return Err(AudioError::NotLoaded);
        }
        s.seeks.push(to);
        s.position = to;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.0.borrow().position
    }

    fn is_finished(&self) -> bool {
        self.0.borrow().finished
    }

    fn shutdown(&mut self, fade_out: Duration) {
        let mut s = self.0.borrow_mut();
        s.playing = false;
        s.shutdown = Some(fade_out);
    }
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<NowPlayingInfo>>>);

impl NowPlaying for Recorder {
    fn publish(&self, info: &NowPlayingInfo) {
        self.0.borrow_mut().push(info.clone());
    }
}

impl Recorder {
    fn last(&self) -> NowPlayingInfo {
        self.0.borrow().last().cloned().expect("nothing published")
    }
}

fn options() -> ControllerOptions {
    ControllerOptions {
        autoplay: false,
        resume_on_track_change: true,
        auto_advance: true,
        tick_interval: Duration::from_secs(1),
        quit_fade_out: Duration::from_millis(250),
        artwork_dir: None,
    }
}

fn playlist() -> Playlist {
    let tracks = ["Insomnia", "Sixteen", "perfecta"]
        .iter()
        .map(|id| Track {
            id: id.to_string(),
            path: PathBuf::from(format!("/bundle/{id}.mp3")),
        })
        .collect();
    Playlist::new(tracks).unwrap()
}

fn setup(
    opts: ControllerOptions,
) -> (
    Controller<FakeBackend, Recorder>,
    FakeBackend,
    Recorder,
    Instant,
) {
    let backend = FakeBackend::default();
    let recorder = Recorder::default();
    let mut c = Controller::new(
        App::new(playlist()),
        backend.clone(),
        recorder.clone(),
        opts,
    );
    let now = Instant::now();
    c.start(now);
    (c, backend, recorder, now)
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[test]
fn start_loads_first_track_paused_and_publishes() {
    let (c, backend, recorder, _) = setup(options());

    assert_eq!(backend.0.borrow().loads, vec![PathBuf::from("/bundle/Insomnia.mp3")]);
    assert!(!backend.0.borrow().playing);
    assert!(c.app().is_loaded());
    assert_eq!(c.app().duration_label(), "3:00");

    let info = recorder.last();
    assert_eq!(info.index, 0);
    assert_eq!(info.title, "Insomnia");
    assert_eq!(info.artist, "Fake Artist");
    assert_eq!(info.length, secs(180));
    assert!(!info.playing);
}

#[test]
fn autoplay_starts_playback_on_start() {
    let (c, backend, _, _) = setup(ControllerOptions {
        autoplay: true,
        ..options()
    });
    assert!(c.app().is_playing());
    assert!(backend.0.borrow().playing);
}

#[test]
fn play_pause_drives_backend_and_clock() {
    let (mut c, backend, recorder, now) = setup(options());

    assert!(!c.handle(ControlCmd::PlayPause, now));
    assert!(backend.0.borrow().playing);
    assert!(recorder.last().playing);
    assert_eq!(c.poll_timeout(now, Duration::from_millis(50)), Duration::from_millis(50));
    assert_eq!(c.poll_timeout(now, secs(5)), secs(1));

    backend.0.borrow_mut().position = Duration::from_millis(1200);
    c.on_tick(now + secs(1));
    assert_eq!(c.app().elapsed(), Duration::from_millis(1200));
    assert_eq!(c.app().elapsed_label(), "0:01");
    assert_eq!(recorder.last().elapsed, Duration::from_millis(1200));

    c.handle(ControlCmd::PlayPause, now + secs(1));
    assert!(!backend.0.borrow().playing);
    assert!(!recorder.last().playing);

    // Clock stopped: no further elapsed updates.
    backend.0.borrow_mut().position = secs(9);
    c.on_tick(now + secs(5));
    assert_eq!(c.app().elapsed(), Duration::from_millis(1200));
    assert_eq!(c.poll_timeout(now, secs(5)), secs(5));
}

#[test]
fn remote_play_and_pause_are_idempotent() {
    let (mut c, _, recorder, now) = setup(options());

    c.handle(ControlCmd::Pause, now);
    let published = recorder.0.borrow().len();
    c.handle(ControlCmd::Pause, now);
    assert_eq!(recorder.0.borrow().len(), published);

    c.handle(ControlCmd::Play, now);
    c.handle(ControlCmd::Play, now);
    assert!(c.app().is_playing());
    assert_eq!(recorder.0.borrow().len(), published + 1);
}

#[test]
fn next_while_playing_resets_then_resumes_new_track() {
    let (mut c, backend, recorder, now) = setup(options());
    c.handle(ControlCmd::Play, now);
    backend.0.borrow_mut().position = secs(40);
    c.on_tick(now + secs(1));
    assert_eq!(c.app().elapsed(), secs(40));

    c.handle(ControlCmd::Next, now + secs(2));

    assert_eq!(c.app().index(), 1);
    assert_eq!(c.app().elapsed(), Duration::ZERO);
    assert!(c.app().is_playing());
    assert!(backend.0.borrow().playing);
    assert_eq!(
        backend.0.borrow().loads.last(),
        Some(&PathBuf::from("/bundle/Sixteen.mp3"))
    );
    let info = recorder.last();
    assert_eq!(info.title, "Sixteen");
    assert_eq!(info.elapsed, Duration::ZERO);
}

#[test]
fn next_while_paused_stays_paused() {
    let (mut c, backend, _, now) = setup(options());
    c.handle(ControlCmd::Next, now);
    assert_eq!(c.app().index(), 1);
    assert!(!c.app().is_playing());
    assert!(!backend.0.borrow().playing);
}

#[test]
fn resume_can_be_disabled() {
    let (mut c, _, _, now) = setup(ControllerOptions {
        resume_on_track_change: false,
        ..options()
    });
    c.handle(ControlCmd::Play, now);
    c.handle(ControlCmd::Next, now);
    assert!(!c.app().is_playing());
}

#[test]
fn next_wraps_and_prev_clamps() {
    let (mut c, _, _, now) = setup(options());
    c.handle(ControlCmd::Next, now);
    c.handle(ControlCmd::Next, now);
    c.handle(ControlCmd::Next, now);
    assert_eq!(c.app().index(), 0);

    c.handle(ControlCmd::Prev, now);
    assert_eq!(c.app().index(), 0);
}

#[test]
fn prev_on_first_track_reloads_it_from_zero() {
    let (mut c, backend, _, now) = setup(options());
    c.handle(ControlCmd::SeekTo(secs(30)), now);
    assert_eq!(c.app().elapsed(), secs(30));

    c.handle(ControlCmd::Prev, now);
    assert_eq!(c.app().elapsed(), Duration::ZERO);
    assert_eq!(backend.0.borrow().loads.len(), 2);
}

#[test]
fn failed_load_leaves_not_playing_with_placeholders() {
    let (mut c, backend, recorder, now) = setup(options());
    backend
        .0
        .borrow_mut()
        .broken
        .push(PathBuf::from("/bundle/Sixteen.mp3"));

    c.handle(ControlCmd::Play, now);
    c.handle(ControlCmd::Next, now);

    assert_eq!(c.app().index(), 1);
    assert!(!c.app().is_playing());
    assert!(!c.app().is_loaded());
    assert_eq!(c.app().elapsed(), Duration::ZERO);
    assert!(c.app().song().is_placeholder());
    assert!(!backend.0.borrow().playing);

    let info = recorder.last();
    assert!(!info.loaded);
    assert_eq!(info.title, crate::audio::PLACEHOLDER_TITLE);

    // Nothing to play: toggling is ignored.
    c.handle(ControlCmd::PlayPause, now);
    assert!(!c.app().is_playing());

    // Moving on recovers.
    c.handle(ControlCmd::Next, now);
    assert!(c.app().is_loaded());
    assert_eq!(c.app().index(), 2);
}

#[test]
fn seeks_clamp_to_track_bounds() {
    let (mut c, backend, _, now) = setup(options());

    c.handle(ControlCmd::SeekTo(secs(500)), now);
    assert_eq!(c.app().elapsed(), secs(180));

    c.handle(ControlCmd::SeekBackward(secs(5)), now);
    assert_eq!(c.app().elapsed(), secs(175));

    c.handle(ControlCmd::SeekTo(secs(2)), now);
    c.handle(ControlCmd::SeekBackward(secs(5)), now);
    assert_eq!(c.app().elapsed(), Duration::ZERO);

    c.handle(ControlCmd::SeekForward(secs(5)), now);
    assert_eq!(c.app().elapsed(), secs(5));

    c.handle(ControlCmd::SeekPercent(50), now);
    assert_eq!(c.app().elapsed(), secs(90));
    assert_eq!(c.app().elapsed_label(), "1:30");

    assert_eq!(
        backend.0.borrow().seeks,
        vec![secs(180), secs(175), secs(2), secs(0), secs(5), secs(90)]
    );
}

#[test]
fn failed_seek_keeps_elapsed() {
    let (mut c, backend, _, now) = setup(options());
    c.handle(ControlCmd::SeekTo(secs(20)), now);
    backend.0.borrow_mut().fail_seek = true;

    c.handle(ControlCmd::SeekTo(secs(60)), now);
    assert_eq!(c.app().elapsed(), secs(20));
}

#[test]
fn stop_pauses_and_rewinds_to_zero() {
    let (mut c, backend, _, now) = setup(options());
    c.handle(ControlCmd::Play, now);
    c.handle(ControlCmd::SeekTo(secs(45)), now);

    c.handle(ControlCmd::Stop, now);
    assert!(!c.app().is_playing());
    assert_eq!(c.app().elapsed(), Duration::ZERO);
    assert_eq!(backend.0.borrow().position, Duration::ZERO);
}

#[test]
fn finished_track_auto_advances() {
    let (mut c, backend, _, now) = setup(options());
    c.handle(ControlCmd::Play, now);
    backend.0.borrow_mut().finished = true;

    c.on_tick(now + secs(1));
    assert_eq!(c.app().index(), 1);
    assert!(c.app().is_playing());
    assert_eq!(c.app().elapsed(), Duration::ZERO);
}

#[test]
fn finished_track_is_reloaded_and_replayable_without_auto_advance() {
    let (mut c, backend, _, now) = setup(ControllerOptions {
        auto_advance: false,
        ..options()
    });
    c.handle(ControlCmd::Play, now);
    backend.0.borrow_mut().position = secs(180);
    backend.0.borrow_mut().finished = true;

    c.on_tick(now + secs(1));
    assert_eq!(c.app().index(), 0);
    assert!(!c.app().is_playing());
    assert!(c.app().is_loaded());
    assert_eq!(c.app().elapsed(), Duration::ZERO);
    assert_eq!(
        backend.0.borrow().loads,
        vec![
            PathBuf::from("/bundle/Insomnia.mp3"),
            PathBuf::from("/bundle/Insomnia.mp3")
        ]
    );
    assert!(!backend.0.borrow().finished);

    c.handle(ControlCmd::Play, now + secs(2));
    assert!(c.app().is_playing());
    assert!(backend.0.borrow().playing);

    // Still playing after the next tick: the fresh track isn't finished.
    backend.0.borrow_mut().position = secs(1);
    c.on_tick(now + secs(3));
    assert!(c.app().is_playing());
    assert_eq!(c.app().elapsed(), secs(1));
}

#[test]
fn quit_shuts_backend_down_with_fade() {
    let (mut c, backend, _, now) = setup(options());
    c.handle(ControlCmd::Play, now);
    assert!(c.handle(ControlCmd::Quit, now));
    assert_eq!(backend.0.borrow().shutdown, Some(Duration::from_millis(250)));
}

#[test]
fn embedded_artwork_is_written_for_art_url() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::default();
    backend.0.borrow_mut().artwork = Some(Artwork {
        data: vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3],
        kind: "jpg",
    });
    let recorder = Recorder::default();
    let mut c = Controller::new(
        App::new(playlist()),
        backend,
        recorder.clone(),
        ControllerOptions {
            artwork_dir: Some(dir.path().to_path_buf()),
            ..options()
        },
    );
    c.start(Instant::now());

    let expected = dir.path().join("cover-0.jpg");
    assert_eq!(
        recorder.last().art_url,
        Some(format!("file://{}", expected.display()))
    );
    assert_eq!(
        std::fs::read(expected).unwrap(),
        vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]
    );
}
