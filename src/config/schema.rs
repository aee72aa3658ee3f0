use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub playback: PlaybackSettings,
    pub catalog: CatalogSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output volume applied to every freshly loaded track (1.0 = unchanged).
    pub volume: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Interval of the playback clock that refreshes elapsed time (milliseconds).
    pub tick_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ encore ~ ".to_string(),
            tick_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Start playing the first track right after startup.
    pub autoplay: bool,
    /// Keep playing after next/prev when the previous track was playing.
    pub resume_on_track_change: bool,
    /// Move on to the next track when the current one ends.
    pub auto_advance: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            autoplay: false,
            resume_on_track_change: true,
            auto_advance: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Directory holding the bundled audio files.
    pub bundle_dir: PathBuf,
    /// File extension of bundled tracks (without dot).
    pub extension: String,
    /// Track identifiers in playlist order. Each resolves to
    /// `<bundle_dir>/<id>.<extension>`.
    ///
    /// An empty list means "scan `bundle_dir` for `extension` files".
    pub tracks: Vec<String>,
}

/// Ids match the bundled file names byte for byte, so the accent in the third
/// one is the decomposed `e` + U+0301 the files were named with.
pub const DEFAULT_TRACKS: [&str; 7] = [
    "JoshWoodward-DW-03-Insomnia",
    "JoshWoodward-DW-07-TheRavenAndTheSwan",
    "aQuie\u{301}nLeImporta",
    "Sixteen",
    "perfecta",
    "seraPorqueTeAmo",
    "laFuerzaDelDestino",
];

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("Music"),
            extension: "mp3".to_string(),
            tracks: DEFAULT_TRACKS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` takes precedence.
    pub filter: String,
    /// Log file path. Defaults to `encore.log` in the system temp directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingSettings {
    /// The file log lines are written to.
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("encore.log"))
    }
}
