use std::path::PathBuf;

/// One bundled audio item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Identifier as listed in the catalog (the file stem of the resource).
    pub id: String,
    /// Resolved location of the audio resource.
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("playlist has no tracks")]
    Empty,
}

/// Immutable, non-empty ordered sequence of tracks.
#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Result<Self, PlaylistError> {
        if tracks.is_empty() {
            return Err(PlaylistError::Empty);
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track at `index`, clamped into range.
    pub fn get(&self, index: usize) -> &Track {
        &self.tracks[index.min(self.tracks.len() - 1)]
    }

    /// Index after `index`, wrapping past the end.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    /// Index before `index`, clamping at the start.
    pub fn prev_index(&self, index: usize) -> usize {
        index.saturating_sub(1).min(self.tracks.len() - 1)
    }
}
