//! Embedded track metadata (title, artist, artwork) read with `lofty`.

use std::path::Path;
use std::time::Duration;

use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use tracing::debug;

pub const PLACEHOLDER_TITLE: &str = "Song Name";
pub const PLACEHOLDER_ARTIST: &str = "Artist Name";

/// Embedded cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub data: Vec<u8>,
    /// File extension of the image type (`png`, `jpg`, ...).
    pub kind: &'static str,
}

impl Artwork {
    fn from_picture(picture: &Picture) -> Option<Self> {
        let data = picture.data().to_vec();
        if data.is_empty() {
            return None;
        }
        let kind = picture
            .mime_type()
            .and_then(mime_extension)
            .unwrap_or_else(|| artwork_kind(&data));
        Some(Self { data, kind })
    }
}

/// Display metadata of the loaded track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
    pub artwork: Option<Artwork>,
}

impl SongInfo {
    /// The fallback shown when a track has no (or unreadable) tags.
    pub fn placeholder() -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            artist: PLACEHOLDER_ARTIST.to_string(),
            artwork: None,
        }
    }

    #[cfg(test)]
    pub fn is_placeholder(&self) -> bool {
        self.title == PLACEHOLDER_TITLE && self.artist == PLACEHOLDER_ARTIST && self.artwork.is_none()
    }
}

impl Default for SongInfo {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Result of reading a file's tags.
#[derive(Debug, Clone, Default)]
pub struct TagReport {
    pub info: SongInfo,
    /// Duration from the container properties, when lofty understands the file.
    pub duration: Option<Duration>,
}

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read title/artist/artwork and duration from `path`.
///
/// Never fails: anything missing or unreadable falls back to the placeholders.
pub fn read_tags(path: &Path) -> TagReport {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable tags");
            return TagReport::default();
        }
    };

    let mut report = TagReport {
        info: SongInfo::placeholder(),
        duration: Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
    };

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(title) = non_empty(tag.title()) {
            report.info.title = title;
        }
        if let Some(artist) = non_empty(tag.artist()) {
            report.info.artist = artist;
        }

        let pictures = tag.pictures();
        report.info.artwork = pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .and_then(Artwork::from_picture);
    }

    report
}

/// Extension for the image type lofty parsed from the tag.
pub(super) fn mime_extension(mime: &MimeType) -> Option<&'static str> {
    match mime {
        MimeType::Png => Some("png"),
        MimeType::Jpeg => Some("jpg"),
        MimeType::Gif => Some("gif"),
        MimeType::Bmp => Some("bmp"),
        MimeType::Tiff => Some("tiff"),
        _ => None,
    }
}

/// Image type from magic bytes, for covers whose tag carries no MIME type.
pub(super) fn artwork_kind(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        "jpg"
    } else if bytes.starts_with(b"GIF8") {
        "gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        "img"
    }
}
