//! Reads GIF animations into frames

use crate::codec::{AnimationDecoder, AnimationResource};
use crate::error::GifResult;
use crate::segment::MediaFrame;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Delays shorter than this are shown at [`SHORT_DELAY_FALLBACK`], like browsers do
const MIN_DELAY: u16 = 2;
const SHORT_DELAY_FALLBACK: u16 = 10;

/// [`AnimationDecoder`] for GIF files
#[derive(Debug, Default, Copy, Clone)]
pub struct GifFrameDecoder;

impl GifFrameDecoder {
    /// Fully composited frames with their display intervals in seconds
    pub fn read_frames(input: impl Read) -> GifResult<Vec<MediaFrame>> {
        let mut gif_opts = gif::DecodeOptions::new();
        // Important:
        gif_opts.set_color_output(gif::ColorOutput::Indexed);

        let mut decoder = gif_opts.read_info(input)?;
        let mut screen = gif_dispose::Screen::new_decoder(&decoder);

        let mut frames = Vec::new();
        while let Some(frame) = decoder.read_next_frame()? {
            screen.blit_frame(frame)?;
            let pixels = screen.pixels_rgba().map_buf(|b| b.to_owned());
            frames.push(MediaFrame::new(Arc::new(pixels), delay_seconds(frame.delay)));
        }
        Ok(frames)
    }

    pub fn read_file(path: &Path) -> GifResult<Vec<MediaFrame>> {
        let file = std::fs::File::open(path)?;
        Self::read_frames(std::io::BufReader::new(file))
    }
}

impl AnimationDecoder for GifFrameDecoder {
    fn decode(&self, resource: &AnimationResource) -> Vec<MediaFrame> {
        match Self::read_file(resource.path()) {
            Ok(frames) => frames,
            Err(err) => {
                tracing::warn!(path = %resource.path().display(), "can't decode animation: {err}");
                Vec::new()
            },
        }
    }
}

/// GIF delays are in 1/100s
pub(crate) fn delay_seconds(delay: u16) -> f64 {
    let delay = if delay < MIN_DELAY { SHORT_DELAY_FALLBACK } else { delay };
    f64::from(delay) / 100.
}
