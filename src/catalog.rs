//! Catalog provider: the fixed, ordered list of bundled tracks.
//!
//! Track identifiers come from `[catalog]` settings; each one resolves to an
//! audio file inside the bundle directory. Nothing here touches the files
//! themselves, so a missing file only shows up when the player tries to load it.

mod model;
mod scan;

pub use model::*;
pub use scan::Catalog;
