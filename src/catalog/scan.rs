use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::CatalogSettings;

use super::model::Track;

/// Static catalog resolved once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build the catalog from settings: the configured identifiers in order, or
    /// a scan of `bundle_dir` when no identifiers are configured.
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        let ext = normalized_extension(&settings.extension);

        let tracks = if settings.tracks.is_empty() {
            scan_bundle(&settings.bundle_dir, &ext)
        } else {
            settings
                .tracks
                .iter()
                .map(|id| Track {
                    id: id.clone(),
                    path: resource_path(&settings.bundle_dir, id, &ext),
                })
                .collect()
        };

        debug!(
            count = tracks.len(),
            dir = %settings.bundle_dir.display(),
            "catalog resolved"
        );

        Self { tracks }
    }

    /// The fixed ordered track list.
    pub fn list_tracks(&self) -> Vec<Track> {
        self.tracks.clone()
    }
}

fn normalized_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn resource_path(dir: &Path, id: &str, ext: &str) -> PathBuf {
    dir.join(format!("{id}.{ext}"))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Collect the `ext` files directly inside `dir`, sorted case-insensitively
/// by identifier.
fn scan_bundle(dir: &Path, ext: &str) -> Vec<Track> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "bundle directory not found");
        return Vec::new();
    }

    let mut tracks: Vec<Track> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case(ext))
                .unwrap_or(false)
        })
        .filter_map(|e| {
            let id = e.path().file_stem().and_then(|s| s.to_str())?.to_string();
            Some(Track {
                id,
                path: e.path().to_path_buf(),
            })
        })
        .collect();

    tracks.sort_by(|a, b| a.id.to_lowercase().cmp(&b.id.to_lowercase()));
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_extension_strips_dot_and_case() {
        assert_eq!(normalized_extension(".MP3"), "mp3");
        assert_eq!(normalized_extension(" flac "), "flac");
    }

    #[test]
    fn resource_path_appends_extension_to_identifier() {
        assert_eq!(
            resource_path(Path::new("/bundle"), "Sixteen", "mp3"),
            PathBuf::from("/bundle/Sixteen.mp3")
        );
    }

    #[test]
    fn scan_of_missing_dir_is_empty() {
        assert!(scan_bundle(Path::new("/definitely/not/here"), "mp3").is_empty());
    }
}
