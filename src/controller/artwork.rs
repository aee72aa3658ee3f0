use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::audio::Artwork;

/// Write the cover of track `index` into `dir`, returning the file path.
pub(super) fn persist_artwork(dir: &Path, index: usize, art: &Artwork) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("cover-{index}.{}", art.kind));
    fs::write(&path, &art.data)?;
    Ok(path)
}

pub(super) fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
