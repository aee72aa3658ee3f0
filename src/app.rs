//! Application module: the playback state-holder driven by the UI.
//!
//! `App` (in `app::model`) owns the playlist cursor, the play/pause flag and
//! elapsed time, and publishes every change as a [`PlayerEvent`] to its
//! subscribers. `app::format` renders the `m:ss` labels it exposes.

mod format;
mod model;

pub use format::*;
pub use model::*;
