use std::path::{Path, PathBuf};
use image::{ImageFormat, ImageReader};
use tracing::trace;

/// Every output is written in this format, whatever the input was.
pub const OUTPUT_FORMAT: ImageFormat = ImageFormat::Png;

/// Extension matching [`OUTPUT_FORMAT`]
pub const OUTPUT_EXTENSION: &str = "png";

/// Returns `path` with its extension replaced by the output extension.
///
/// Only the last extension is replaced (`a.tar.gz` -> `a.tar.png`); a path
/// without one gets it appended.
pub fn with_output_extension(path: &Path) -> PathBuf {
    path.with_extension(OUTPUT_EXTENSION)
}

/// Checks whether `path` can be opened as an image.
///
/// Only the header is read. I/O errors, unknown formats and malformed headers
/// all count as "not an image"; nothing is raised.
pub fn probe_image(path: &Path) -> bool {
    let reader = match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
        Ok(reader) => reader,
        Err(e) => {
            trace!("Probe could not open {}: {}", path.display(), e);
            return false;
        }
    };

    match reader.into_dimensions() {
        Ok((width, height)) => {
            trace!("Probe accepted {} ({}x{})", path.display(), width, height);
            true
        }
        Err(e) => {
            trace!("Probe rejected {}: {}", path.display(), e);
            false
        }
    }
}
