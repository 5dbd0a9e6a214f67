//! Image decoding and scaling for overlay blits.

use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use crate::render::errors::RenderError;
use crate::render::types::RenderedImage;

/// Load an image file and scale it to fit within `max_width` x `max_height`
/// pixels, preserving aspect ratio and never upscaling.
///
/// The result is converted to the server's BGRx byte order, ready for a
/// ZPixmap blit.
pub fn load(path: &Path, max_width: u32, max_height: u32) -> Result<RenderedImage, RenderError> {
    let decoded = image::open(path).map_err(|e| RenderError::LoadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if max_width == 0 || max_height == 0 || decoded.width() == 0 || decoded.height() == 0 {
        return Err(RenderError::EmptyImage {
            path: path.display().to_string(),
        });
    }

    // thumbnail() stretches smaller sources up to the bounds, so scale only
    // when the source actually exceeds the box
    let scaled = if decoded.width() <= max_width && decoded.height() <= max_height {
        decoded.to_rgba8()
    } else {
        decoded.thumbnail(max_width, max_height).to_rgba8()
    };

    debug!(
        event = "core.render.image_loaded",
        path = %path.display(),
        source_width = decoded.width(),
        source_height = decoded.height(),
        scaled_width = scaled.width(),
        scaled_height = scaled.height()
    );

    Ok(to_server_order(&scaled))
}

/// Convert RGBA rows into 4-byte BGRx units.
///
/// Alpha is dropped: the overlay window has an opaque background and the
/// server ignores the pad byte at depth 24.
fn to_server_order(rgba: &RgbaImage) -> RenderedImage {
    let (width, height) = rgba.dimensions();
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);

    for pixel in rgba.pixels() {
        let [r, g, b, _a] = pixel.0;
        data.extend_from_slice(&[b, g, r, 0]);
    }

    RenderedImage {
        width,
        height,
        data,
    }
}
