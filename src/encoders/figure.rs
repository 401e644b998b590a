use image::{DynamicImage, ImageFormat};
use std::path::Path;

use super::EncodingError;

/// Anything that can draw itself into a bitmap, such as a chart.
pub trait Figure {
    fn rasterize(&self) -> anyhow::Result<DynamicImage>;
}

pub fn encode(figure: &dyn Figure, destination: &Path) -> Result<(), EncodingError> {
    let image = figure
        .rasterize()
        .map_err(|e| EncodingError::Rasterize(e.into()))?;
    super::bitmap::encode(&image, ImageFormat::Png, destination)
}
