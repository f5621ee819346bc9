use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage};
use thiserror::Error;

// Failures while writing rendered frames to disk
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("no frames to encode")]
    EmptySeries,

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct GifOptions {
    // per-frame delay in milliseconds
    pub delay_ms: u32,
    pub loop_forever: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            delay_ms: 10,
            loop_forever: true,
        }
    }
}

// Write a single frame as a PNG
pub fn save_png(frame: &RgbImage, path: impl AsRef<Path>) -> Result<(), EncodeError> {
    frame.save(path.as_ref())?;
    Ok(())
}

// Stream a frame sequence into an animated GIF. Frames are consumed
// one at a time, so a long series never sits in memory whole.
// Returns the number of frames written; an empty series is an error.
pub fn save_gif(
    frames: impl IntoIterator<Item = RgbImage>,
    path: impl AsRef<Path>,
    opts: &GifOptions,
) -> Result<usize, EncodeError> {
    let file = File::create(path.as_ref())?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    if opts.loop_forever {
        encoder.set_repeat(Repeat::Infinite)?;
    }

    let delay = Delay::from_numer_denom_ms(opts.delay_ms, 1);
    let mut count = 0;
    for frame in frames {
        let rgba = DynamicImage::ImageRgb8(frame).into_rgba8();
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        count += 1;
    }

    if count == 0 {
        return Err(EncodeError::EmptySeries);
    }
    Ok(count)
}
