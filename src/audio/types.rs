//! Audio-related small types and the backend seam.
//!
//! This module defines the [`MediaBackend`] trait the controller drives, what a
//! successful load reports, and the errors a backend may return.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::metadata::SongInfo;

/// What the backend reports once a track is ready to play.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrack {
    pub duration: Duration,
    pub info: SongInfo,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoOutput(#[from] rodio::StreamError),
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("seek failed: {0}")]
    Seek(#[from] rodio::source::SeekError),
    #[error("no track loaded")]
    NotLoaded,
}

/// Media-playback capability: one loaded track at a time.
///
/// `load` replaces whatever was loaded before; a failed load leaves nothing
/// loaded. Freshly loaded tracks start paused at zero.
pub trait MediaBackend {
    fn load(&mut self, path: &Path) -> Result<LoadedTrack, AudioError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, to: Duration) -> Result<(), AudioError>;
    /// Current playback position of the loaded track.
    fn position(&self) -> Duration;
    /// True once the loaded track has played to its end.
    fn is_finished(&self) -> bool;
    /// Stop output, fading out over `fade_out`.
    fn shutdown(&mut self, fade_out: Duration);
}
