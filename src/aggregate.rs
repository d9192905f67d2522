//! Merges per-segment frame batches into one ordered frame sequence

use crate::codec::{AnimationDecoder, AnimationEncoder};
use crate::decode::GifFrameDecoder;
use crate::encode::GifResampler;
use crate::error::{Error, GifResult};
use crate::segment::{MediaFrame, Segment};
use crate::{minipool, ordqueue, LoaderSettings};
use std::path::Path;
use std::sync::Arc;

/// Turns segments into frames
///
/// Stills become one frame each. Clips are encoded into an intermediate animation and
/// decoded back into frames, concurrently, one pool thread per clip up to
/// [`LoaderSettings::max_threads`]. A clip that fails to encode contributes no frames.
///
/// The output is always in segment order, however the clips finish.
#[derive(Clone)]
pub struct FrameAggregator {
    encoder: Arc<dyn AnimationEncoder>,
    decoder: Arc<dyn AnimationDecoder>,
    settings: LoaderSettings,
}

impl FrameAggregator {
    pub fn new(encoder: impl AnimationEncoder + 'static, decoder: impl AnimationDecoder + 'static, settings: LoaderSettings) -> Self {
        Self {
            encoder: Arc::new(encoder),
            decoder: Arc::new(decoder),
            settings,
        }
    }

    /// Clips are expected to be GIF files
    pub fn gif(settings: LoaderSettings) -> Self {
        Self::new(GifResampler, GifFrameDecoder, settings)
    }

    #[inline]
    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Blocks until every segment has been resolved.
    ///
    /// `default_interval` is the display time of stills that don't have their own.
    pub fn aggregate(&self, segments: &[Segment], default_interval: f64) -> GifResult<Vec<MediaFrame>> {
        self.aggregate_until(segments, default_interval, &|| false)
    }

    /// Like [`aggregate`](Self::aggregate), but gives up with [`Error::Aborted`] once `is_stale` returns true.
    ///
    /// Staleness is checked before each segment is dispatched and before each clip is encoded.
    /// Encoding or decoding already in progress runs to completion.
    pub fn aggregate_until(&self, segments: &[Segment], default_interval: f64, is_stale: &(dyn Fn() -> bool + Sync)) -> GifResult<Vec<MediaFrame>> {
        let clips = segments.iter().filter(|s| s.video_path().is_some()).count();
        let num_threads = clips.clamp(1, self.settings.max_threads.max(1).into()) as u8;
        let (queue, batches) = ordqueue::new(segments.len());
        let clip_queue = queue.clone();

        tracing::debug!(segments = segments.len(), clips, num_threads, "aggregating frames");
        minipool::run(num_threads, "segment", move |clip_jobs| {
            for (index, segment) in segments.iter().enumerate() {
                if is_stale() {
                    return Err(Error::Aborted);
                }
                match segment {
                    Segment::Image { image, interval, .. } => {
                        let frame = MediaFrame::new(image.clone(), interval.unwrap_or(default_interval));
                        queue.push(index, vec![frame])?;
                    },
                    Segment::Video { path } => clip_jobs.dispatch((index, path.as_path()))?,
                }
            }
            Ok(())
        }, move |(index, path)| {
            let frames = if is_stale() { Vec::new() } else { self.resolve_clip(index, path) };
            clip_queue.push(index, frames)
        })?;

        if is_stale() {
            return Err(Error::Aborted);
        }
        Ok(batches.flatten().collect())
    }

    fn resolve_clip(&self, index: usize, path: &Path) -> Vec<MediaFrame> {
        let Some(resource) = self.encoder.encode(path, self.settings.repeat, self.settings.frames_per_second) else {
            tracing::warn!(index, path = %path.display(), "clip produced no animation, skipping it");
            return Vec::new();
        };
        let frames = self.decoder.decode(&resource);
        tracing::debug!(index, frames = frames.len(), "resolved clip");
        frames
    }
}
