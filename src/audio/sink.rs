//! Utilities for creating `rodio` sinks from track files.
//!
//! The helpers here encapsulate opening/decoding a file and preparing a
//! paused `Sink` for it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink};

use super::types::AudioError;

pub(super) type FileSource = Decoder<BufReader<File>>;

/// Open and decode `path` without touching any output device.
pub(super) fn open_source(path: &Path) -> Result<FileSource, AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Create a paused `Sink` on `stream` playing `source` at `volume`.
pub(super) fn create_sink(stream: &OutputStream, source: FileSource, volume: f32) -> Sink {
    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    sink
}

/// Ramp `sink` from `volume` down to silence over `fade_out_ms`.
pub(super) fn fade_out_sink(sink: &Sink, volume: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 || sink.is_paused() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(volume * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
