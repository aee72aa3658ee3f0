use std::path::Path;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info};

use crate::config::AudioSettings;

use super::metadata::read_tags;
use super::sink::{create_sink, fade_out_sink, open_source};
use super::types::{AudioError, LoadedTrack, MediaBackend};

/// `rodio`-backed player owning the output stream and at most one sink.
///
/// Lives on the UI thread; every `load` swaps in a brand-new sink.
pub struct AudioPlayer {
    stream: OutputStream,
    sink: Option<Sink>,
    volume: f32,
}

impl AudioPlayer {
    pub fn new(audio_settings: &AudioSettings) -> Result<Self, AudioError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            volume: audio_settings.volume,
        })
    }

    fn sink(&self) -> Result<&Sink, AudioError> {
        self.sink.as_ref().ok_or(AudioError::NotLoaded)
    }
}

impl MediaBackend for AudioPlayer {
    fn load(&mut self, path: &Path) -> Result<LoadedTrack, AudioError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let source = open_source(path)?;
        let decoded_len = source.total_duration();
        let tags = read_tags(path);

        self.sink = Some(create_sink(&self.stream, source, self.volume));

        let duration = tags.duration.or(decoded_len).unwrap_or_default();
        info!(path = %path.display(), secs = duration.as_secs(), "track loaded");
        Ok(LoadedTrack {
            duration,
            info: tags.info,
        })
    }

    fn play(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
        }
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn seek(&mut self, to: Duration) -> Result<(), AudioError> {
        self.sink()?.try_seek(to)?;
        debug!(secs = to.as_secs_f64(), "seeked");
        Ok(())
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map(|s| s.get_pos()).unwrap_or_default()
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().map(|s| s.empty()).unwrap_or(false)
    }

    fn shutdown(&mut self, fade_out: Duration) {
        if let Some(s) = self.sink.take() {
            fade_out_sink(&s, self.volume, fade_out.as_millis() as u64);
            s.stop();
        }
    }
}
