//! Resamples animated GIF clips into an intermediate GIF at a fixed frame rate

use crate::codec::{AnimationEncoder, AnimationResource, Repeat};
use crate::decode::delay_seconds;
use crate::error::{Error, GifResult};
use imgref::ImgVec;
use rgb::RGBA8;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// 1 is best quality, 30 is fastest. Passed to the gif crate's NeuQuant palette search.
const QUANTIZE_SPEED: i32 = 10;

/// [`AnimationEncoder`] for clips stored as GIF files
///
/// Frames closer together than `1/fps` are dropped, and every kept frame lasts until
/// the next kept one, so total duration is preserved. Anything that isn't a GIF is
/// reported as unencodable.
#[derive(Debug, Default, Copy, Clone)]
pub struct GifResampler;

struct Sample {
    pixels: ImgVec<RGBA8>,
    /// Seconds since clip start
    pts: f64,
}

impl GifResampler {
    /// Writes the resampled clip to `out`
    pub fn resample(input: impl Read, out: impl Write, repeat: Repeat, frames_per_second: f32) -> GifResult<usize> {
        let (samples, total_duration) = Self::sample(input, frames_per_second)?;
        let first = samples.first().ok_or(Error::NoFrames)?;
        let width = u16::try_from(first.pixels.width()).map_err(|e| Error::UnsupportedInput(e.to_string()))?;
        let height = u16::try_from(first.pixels.height()).map_err(|e| Error::UnsupportedInput(e.to_string()))?;

        let mut enc = gif::Encoder::new(out, width, height, &[])?;
        enc.set_repeat(repeat)?;

        let count = samples.len();
        let mut samples = samples.into_iter().peekable();
        while let Some(sample) = samples.next() {
            let end = samples.peek().map_or(total_duration, |next| next.pts);
            let delay = ((end - sample.pts) * 100.).round().clamp(1., f64::from(u16::MAX)) as u16;

            let (mut buf, w, h) = sample.pixels.into_contiguous_buf();
            let mut frame = gif::Frame::from_rgba_speed(w as u16, h as u16, rgb::bytemuck::cast_slice_mut(&mut buf), QUANTIZE_SPEED);
            frame.delay = delay;
            enc.write_frame(&frame)?;
        }
        Ok(count)
    }

    fn sample(input: impl Read, frames_per_second: f32) -> GifResult<(Vec<Sample>, f64)> {
        let mut gif_opts = gif::DecodeOptions::new();
        gif_opts.set_color_output(gif::ColorOutput::Indexed);
        let mut decoder = gif_opts.read_info(input)?;
        let mut screen = gif_dispose::Screen::new_decoder(&decoder);

        let wanted_frame_time = 1. / f64::from(frames_per_second.max(0.1));
        let mut wanted_pts = 0.;
        let mut pts = 0.;
        let mut samples = Vec::new();
        while let Some(frame) = decoder.read_next_frame()? {
            screen.blit_frame(frame)?;
            let frame_pts = pts;
            pts += delay_seconds(frame.delay);
            // small epsilon so that exact multiples of the frame time aren't dropped
            if frame_pts + 1e-6 < wanted_pts {
                continue;
            }
            while wanted_pts <= frame_pts + 1e-6 {
                wanted_pts += wanted_frame_time;
            }
            samples.push(Sample {
                pixels: screen.pixels_rgba().map_buf(|b| b.to_owned()),
                pts: frame_pts,
            });
        }
        Ok((samples, pts))
    }

    fn encode_to_temp(video: &Path, repeat: Repeat, frames_per_second: f32) -> GifResult<AnimationResource> {
        let input = std::io::BufReader::new(File::open(video)?);
        let temp = tempfile::Builder::new().prefix("gifmaker").suffix(".gif").tempfile()?;
        let (file, temp_path) = temp.into_parts();
        let mut out = BufWriter::new(file);
        let frames = Self::resample(input, &mut out, repeat, frames_per_second)?;
        out.flush()?;
        tracing::debug!(src = %video.display(), frames, "resampled clip");
        Ok(AnimationResource::temporary(temp_path))
    }
}

impl AnimationEncoder for GifResampler {
    fn encode(&self, video: &Path, repeat: Repeat, frames_per_second: f32) -> Option<AnimationResource> {
        match Self::encode_to_temp(video, repeat, frames_per_second) {
            Ok(resource) => Some(resource),
            Err(err) => {
                tracing::warn!(src = %video.display(), "can't encode clip: {err}");
                None
            },
        }
    }
}
