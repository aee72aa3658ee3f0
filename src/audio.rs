//! Audio playback and track metadata.
//!
//! The player core talks to audio through the [`MediaBackend`] trait; the
//! production backend drives `rodio` for decoding/output and `lofty` for
//! embedded tags.

mod metadata;
mod player;
mod sink;
mod types;

pub use metadata::*;
pub use player::AudioPlayer;
pub use types::*;

#[cfg(test)]
mod tests;
