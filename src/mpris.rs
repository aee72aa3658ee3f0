use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, info, warn};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::controller::{NowPlaying, NowPlayingInfo};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.encore";
const NOTIFY_POLL: Duration = Duration::from_millis(100);

/// Transport commands, from the keyboard or from a remote MPRIS client.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    SeekForward(Duration),
    SeekBackward(Duration),
    SeekTo(Duration),
    SeekPercent(u8),
}

#[derive(Debug, Default, Clone, PartialEq)]
struct SharedState {
    playing: bool,
    loaded: bool,
    track_id: Option<OwnedObjectPath>,
    title: Option<String>,
    artist: Vec<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
}

impl SharedState {
    fn from_info(info: &NowPlayingInfo) -> Self {
        Self {
            playing: info.playing,
            loaded: info.loaded,
            track_id: track_path(info.index),
            title: Some(info.title.clone()),
            artist: vec![info.artist.clone()],
            url: Some(format!("file://{}", info.path.display())),
            art_url: info.art_url.clone(),
            length_micros: (info.loaded && !info.length.is_zero())
                .then(|| micros(info.length)),
            position_micros: micros(info.elapsed),
        }
    }

    /// Everything except the position, which MPRIS clients poll instead.
    fn same_signalled_props(&self, other: &Self) -> bool {
        Self {
            position_micros: 0,
            ..self.clone()
        } == Self {
            position_micros: 0,
            ..other.clone()
        }
    }

    fn status(&self) -> &'static str {
        match (self.loaded, self.playing) {
            (false, _) => "Stopped",
            (true, true) => "Playing",
            (true, false) => "Paused",
        }
    }
}

fn track_path(index: usize) -> Option<OwnedObjectPath> {
    ObjectPath::try_from(format!("{OBJECT_PATH}/track/{index}"))
        .ok()
        .map(OwnedObjectPath::from)
}

fn micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

/// Main-thread side of the MPRIS service.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl NowPlaying for MprisHandle {
    fn publish(&self, info: &NowPlayingInfo) {
        let next = SharedState::from_info(info);
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        let changed = !s.same_signalled_props(&next);
        *s = next;
        drop(s);
        if changed {
            // The service thread may be gone (no session bus); that's fine.
            let _ = self.notify.send(());
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // Nothing to raise in a terminal.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        "encore".to_string()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec!["audio/mpeg".to_string()]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn send(&self, cmd: ControlCmd) {
        let _ = self.tx.send(cmd);
    }

    fn snapshot(&self) -> SharedState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(ControlCmd::Next);
    }

    fn previous(&self) {
        self.send(ControlCmd::Prev);
    }

    fn play(&self) {
        self.send(ControlCmd::Play);
    }

    fn pause(&self) {
        self.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        self.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        self.send(ControlCmd::Stop);
    }

    /// Relative seek in microseconds; negative values seek backwards.
    fn seek(&self, offset: i64) {
        let by = Duration::from_micros(offset.unsigned_abs());
        if offset >= 0 {
            self.send(ControlCmd::SeekForward(by));
        } else {
            self.send(ControlCmd::SeekBackward(by));
        }
    }

    fn set_position(&self, track_id: OwnedObjectPath, position: i64) {
        let s = self.snapshot();
        if s.track_id.as_ref() != Some(&track_id) {
            debug!(track_id = %track_id.as_str(), "stale SetPosition ignored");
            return;
        }
        if position < 0 || s.length_micros.is_some_and(|len| position > len) {
            return;
        }
        self.send(ControlCmd::SeekTo(Duration::from_micros(position.unsigned_abs())));
    }

    #[zbus(property)]
    fn playback_status(&self) -> String {
        self.snapshot().status().to_string()
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.snapshot().position_micros
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.snapshot().loaded
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.snapshot().loaded
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.snapshot().loaded
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let s = self.snapshot();
        let mut map = HashMap::new();

        if let Some(id) = s.track_id {
            insert(&mut map, "mpris:trackid", Value::from(id.into_inner()));
        }
        if let Some(title) = s.title {
            insert(&mut map, "xesam:title", Value::from(title));
        }
        if !s.artist.is_empty() {
            insert(&mut map, "xesam:artist", Value::from(s.artist));
        }
        if let Some(url) = s.url {
            insert(&mut map, "xesam:url", Value::from(url));
        }
        if let Some(len) = s.length_micros {
            insert(&mut map, "mpris:length", Value::from(len));
        }
        if let Some(art) = s.art_url {
            insert(&mut map, "mpris:artUrl", Value::from(art));
        }
        map
    }
}

fn insert(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match value.try_to_owned() {
        Ok(v) => {
            map.insert(key.to_string(), v);
        }
        Err(e) => debug!(key, error = %e, "skipping metadata entry"),
    }
}

async fn emit_changes(player: &InterfaceRef<PlayerIface>) -> zbus::Result<()> {
    let emitter = player.signal_emitter();
    let iface = player.get().await;
    iface.playback_status_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    iface.can_play_changed(emitter).await?;
    iface.can_pause_changed(emitter).await?;
    iface.can_seek_changed(emitter).await?;
    Ok(())
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    info!(name = BUS_NAME, "MPRIS service registered");

    loop {
        Timer::after(NOTIFY_POLL).await;

        let mut changed = false;
        loop {
            match notify.try_recv() {
                Ok(()) => changed = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if !changed {
            continue;
        }
        if let Err(e) = emit_changes(&player).await {
            warn!(error = %e, "failed to emit PropertiesChanged");
        }
    }
}

/// Start the MPRIS service on its own thread.
///
/// Remote commands come back over `tx`. If the session bus is unavailable the
/// failure is logged and the returned handle silently discards updates.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("mpris".to_string())
        .spawn(move || {
            if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
                warn!(error = %e, "MPRIS unavailable");
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "failed to spawn MPRIS thread");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}
