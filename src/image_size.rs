//! Local image dimension probe used when the server reports no size.
//!
//! Only the image header is read. Any failure yields `None`, which the
//! overlay mapper treats as an unknown `(0, 0)` size.

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

pub fn measure_file(path: &Path) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok(dims) => Some(dims),
        Err(err) => {
            log::debug!("could not measure {}: {}", path.display(), err);
            None
        }
    }
}

pub fn measure_bytes(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dims) => Some(dims),
        Err(err) => {
            log::debug!("could not measure in-memory image: {}", err);
            None
        }
    }
}
