use std::path::PathBuf;

use thiserror::Error;

/// Failures the overlay engine and navigation can report.
///
/// A missing label file or a malformed annotation line is not an error:
/// both degrade to a defined fallback inside the engine.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("cannot read image {}: {source}", .path.display())]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no images to navigate")]
    EmptyFolder,
}
