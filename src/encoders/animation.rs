use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::EncodingError;

pub const DEFAULT_FRAME_DELAY_MS: u32 = 100;

/// How often an animation plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Looping {
    #[default]
    Forever,
    Times(u16),
}

impl From<Looping> for Repeat {
    fn from(looping: Looping) -> Self {
        match looping {
            Looping::Forever => Repeat::Infinite,
            Looping::Times(n) => Repeat::Finite(n),
        }
    }
}

/// Writes `frames` as one animated GIF.
pub fn encode(
    frames: &[DynamicImage],
    frame_delay_ms: u32,
    looping: Looping,
    destination: &Path,
) -> Result<(), EncodingError> {
    if frames.is_empty() {
        return Err(EncodingError::Unsupported("animation has no frames".to_string()));
    }

    let file = File::create(destination).map_err(|e| EncodingError::io(destination, e))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(looping.into())?;

    let delay = Delay::from_numer_denom_ms(frame_delay_ms, 1);
    encoder.encode_frames(
        frames
            .iter()
            .map(|frame| Frame::from_parts(frame.to_rgba8(), 0, 0, delay)),
    )?;
    Ok(())
}
