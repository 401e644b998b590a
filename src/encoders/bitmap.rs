use image::{DynamicImage, ImageFormat};
use std::path::Path;

use super::EncodingError;

/// Writes `image` in `format`. Formats that cannot hold the image's color
/// type (e.g. RGBA as JPEG) surface as `EncodingError::Image`.
pub fn encode(image: &DynamicImage, format: ImageFormat, destination: &Path) -> Result<(), EncodingError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EncodingError::Unsupported("image has no pixels".to_string()));
    }
    image.save_with_format(destination, format)?;
    Ok(())
}
