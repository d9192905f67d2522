//! Coordinates loading and editing of one GIF

use crate::aggregate::FrameAggregator;
use crate::error::{Error, GifResult};
use crate::playback::{self, MediaPlayer};
use crate::segment::{MediaFrame, Raster, Segment};
use crate::settings::{PlaybackMode, PlaybackSettings};
use crate::LoaderSettings;
use crossbeam_channel::{Receiver, TryRecvError};
use std::ops::RangeInclusive;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering::SeqCst};
use std::sync::Arc;
use std::thread;

/// The editor screen that presents the GIF maker
pub trait GifMakerHandlerDelegate {
    /// The user is done editing
    fn did_confirm_gif(&self);

    /// Display time in seconds for stills that don't have one. Only asked when needed.
    ///
    /// Values that aren't finite and positive are replaced with [`LoaderSettings::default_image_interval`].
    fn default_time_interval_for_image_segments(&self) -> f64;

    /// Called whenever the loaded frames change, with 0 when they're cleared
    fn set_thumbnails(&self, count: usize);
}

type LoadResult = GifResult<Vec<MediaFrame>>;

struct PendingLoad {
    generation: u64,
    result: Receiver<LoadResult>,
    on_loading_end: Box<dyn FnOnce()>,
    completion: Box<dyn FnOnce(bool)>,
}

impl PendingLoad {
    fn finish(self, loaded: bool) {
        (self.on_loading_end)();
        (self.completion)(loaded);
    }
}

/// Owns the loaded frames and their [`PlaybackSettings`], and is the only way to change them.
///
/// All methods are meant to be called from one thread. Loading runs in the background,
/// and its completion is delivered by [`poll()`](Self::poll) or [`wait()`](Self::wait)
/// on the calling thread.
pub struct GifMakerHandler<P> {
    player: P,
    aggregator: FrameAggregator,
    delegate: Option<Weak<dyn GifMakerHandlerDelegate>>,
    frames: Option<Vec<MediaFrame>>,
    segments: Option<Vec<Segment>>,
    settings: Option<PlaybackSettings>,
    previous_trim: Option<RangeInclusive<f64>>,
    /// Bumped when a load is superseded, so that its thread and result can be recognized as stale
    generation: Arc<AtomicU64>,
    pending: Option<PendingLoad>,
}

impl<P: MediaPlayer> GifMakerHandler<P> {
    pub fn new(player: P, aggregator: FrameAggregator) -> Self {
        Self {
            player,
            aggregator,
            delegate: None,
            frames: None,
            segments: None,
            settings: None,
            previous_trim: None,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Loads clips from GIF files with default [`LoaderSettings`]
    pub fn with_player(player: P) -> Self {
        Self::new(player, FrameAggregator::gif(LoaderSettings::default()))
    }

    /// Doesn't keep the delegate alive
    pub fn set_delegate<D: GifMakerHandlerDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let delegate: Weak<dyn GifMakerHandlerDelegate> = Rc::<D>::downgrade(delegate);
        self.delegate = Some(delegate);
    }

    fn delegate(&self) -> Option<Rc<dyn GifMakerHandlerDelegate>> {
        self.delegate.as_ref()?.upgrade()
    }

    /// Starts turning `segments` into frames, unless frames are already loaded.
    ///
    /// `on_loading_start` is called right away, only if loading actually starts.
    /// `on_loading_end` and then `completion` are always called exactly once: immediately if
    /// nothing needs loading, otherwise from [`poll()`](Self::poll) or [`wait()`](Self::wait).
    /// `completion` gets `true` only if new frames have been loaded.
    ///
    /// A load that's still running is superseded, and its callbacks are called with `false`.
    pub fn load<S, E, C>(&mut self, segments: Vec<Segment>, on_loading_start: S, on_loading_end: E, completion: C)
    where
        S: FnOnce(),
        E: FnOnce() + 'static,
        C: FnOnce(bool) + 'static,
    {
        if self.frames.is_some() {
            tracing::debug!("frames already loaded");
            on_loading_end();
            completion(false);
            return;
        }
        self.cancel_pending();
        on_loading_start();

        let default_interval = if segments.iter().any(Segment::needs_default_interval) {
            self.default_image_interval()
        } else {
            self.aggregator.settings().default_image_interval
        };
        let generation = self.generation.fetch_add(1, SeqCst) + 1;
        let current_generation = Arc::clone(&self.generation);
        let aggregator = self.aggregator.clone();
        let (sender, result) = crossbeam_channel::bounded(1);

        tracing::info!(segments = segments.len(), generation, "loading frames");
        let spawned = thread::Builder::new().name("gif-load".into()).spawn(move || {
            let is_stale = || current_generation.load(SeqCst) != generation;
            let res = aggregator.aggregate_until(&segments, default_interval, &is_stale);
            // the handler may be gone already
            let _ = sender.send(res);
        });

        let pending = PendingLoad {
            generation,
            result,
            on_loading_end: Box::new(on_loading_end),
            completion: Box::new(completion),
        };
        match spawned {
            Ok(_) => self.pending = Some(pending),
            Err(err) => {
                tracing::error!("can't start loading thread: {err}");
                pending.finish(false);
            },
        }
    }

    /// Delivers the load completion if the background work has finished.
    ///
    /// Returns `true` if a load has been completed by this call.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };
        let result = match pending.result.try_recv() {
            Ok(res) => Some(res),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => None,
        };
        match self.pending.take() {
            Some(pending) => {
                self.finish_load(pending, result);
                true
            },
            None => false,
        }
    }

    /// Blocks until the pending load (if any) completes, and delivers its completion.
    pub fn wait(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let result = pending.result.recv().ok();
        self.finish_load(pending, result);
        true
    }

    fn finish_load(&mut self, pending: PendingLoad, result: Option<LoadResult>) {
        let is_current = self.generation.load(SeqCst) == pending.generation;
        let loaded = match result {
            Some(Ok(frames)) if is_current && !frames.is_empty() => {
                tracing::info!(frames = frames.len(), "frames loaded");
                self.set_frames(frames);
                true
            },
            Some(Ok(_)) if is_current => {
                tracing::warn!("segments produced no frames");
                false
            },
            Some(Ok(_) | Err(Error::Aborted)) => {
                tracing::debug!(generation = pending.generation, "discarded stale load");
                false
            },
            Some(Err(err)) => {
                tracing::error!("loading frames failed: {err}");
                false
            },
            None => {
                tracing::error!("loading thread died");
                false
            },
        };
        pending.finish(loaded);
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.generation.fetch_add(1, SeqCst);
            tracing::debug!(generation = pending.generation, "superseded in-flight load");
            pending.finish(false);
        }
    }

    fn default_image_interval(&self) -> f64 {
        let fallback = self.aggregator.settings().default_image_interval;
        let Some(delegate) = self.delegate() else {
            return fallback;
        };
        let interval = delegate.default_time_interval_for_image_segments();
        if interval.is_finite() && interval > 0. {
            interval
        } else {
            tracing::warn!(interval, fallback, "delegate gave an unusable image duration");
            fallback
        }
    }

    fn set_frames(&mut self, frames: Vec<MediaFrame>) {
        let count = frames.len();
        self.segments = Some(frames.iter().map(MediaFrame::to_segment).collect());
        let settings = PlaybackSettings::new(count);
        self.player.set_frames(frames.clone());
        self.sync_player(&settings);
        self.settings = Some(settings);
        self.frames = Some(frames);
        if let Some(delegate) = self.delegate() {
            delegate.set_thumbnails(count);
        }
    }

    /// Forgets the loaded frames and their settings, and invalidates a load in progress.
    pub fn clear(&mut self) {
        self.cancel_pending();
        self.frames = None;
        self.segments = None;
        self.settings = None;
        self.previous_trim = None;
        self.player.cancel_playing_single_frame();
        self.player.set_frames(Vec::new());
        if let Some(delegate) = self.delegate() {
            delegate.set_thumbnails(0);
        }
    }

    fn sync_player(&mut self, settings: &PlaybackSettings) {
        self.player.set_rate(settings.rate());
        self.player.set_playback_mode(settings.mode());
        self.player.set_start_media_index(settings.start_index());
        self.player.set_end_media_index(settings.end_index());
    }

    /// The loaded frames as stills, one per frame. `None` until loaded.
    pub fn segments(&self) -> Option<&[Segment]> {
        self.segments.as_deref()
    }

    pub fn frames(&self) -> Option<&[MediaFrame]> {
        self.frames.as_deref()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(0, Vec::len)
    }

    pub fn settings(&self) -> Option<PlaybackSettings> {
        self.settings
    }

    /// There's something loaded to export
    pub fn should_export(&self) -> bool {
        self.frames.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// The part of `segments` within the trim range. Empty if nothing is loaded.
    pub fn trimmed_segments(&self, segments: &[Segment]) -> Vec<Segment> {
        let Some(settings) = &self.settings else {
            return Vec::new();
        };
        let Some(last) = segments.len().checked_sub(1) else {
            return Vec::new();
        };
        segments.get(settings.start_index()..=settings.end_index().min(last))
            .map(<[Segment]>::to_vec)
            .unwrap_or_default()
    }

    /// `frames` sped up or slowed down by the rate, in the playback mode's order.
    /// Empty if nothing is loaded.
    pub fn frames_for_playback(&self, frames: &[MediaFrame]) -> Vec<MediaFrame> {
        match &self.settings {
            Some(settings) => playback::frames_for_playback(frames, settings.rate(), settings.mode()),
            None => Vec::new(),
        }
    }

    /// The loaded frames after trimming, speed and mode
    pub fn playback_frames(&self) -> Vec<MediaFrame> {
        let Some(segments) = &self.segments else {
            return Vec::new();
        };
        let trimmed = self.trimmed_segments(segments).iter().filter_map(Segment::to_frame).collect::<Vec<_>>();
        self.frames_for_playback(&trimmed)
    }

    pub fn did_confirm_gif(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.did_confirm_gif();
        }
    }

    pub fn did_start_trimming(&mut self) {
        self.previous_trim = Some(0.0..=100.0);
    }

    /// Previews the frame under whichever trim handle moved. Percentages are 0 to 100.
    #[allow(clippy::float_cmp)]
    pub fn did_trim(&mut self, start_percentage: f64, end_percentage: f64) {
        let Some(previous_trim) = &self.previous_trim else {
            return;
        };
        if *previous_trim.start() != start_percentage {
            self.player.play_single_frame(start_percentage / 100.);
        } else if *previous_trim.end() != end_percentage {
            self.player.play_single_frame(end_percentage / 100.);
        }
        self.previous_trim = Some(start_percentage..=end_percentage);
    }

    /// Commits the trim range and resumes playback.
    ///
    /// The start handle sits before frame `floor(count * start / 100)`, and the end handle
    /// after frame `ceil(count * end / 100) - 1`. Both are clamped to the loaded frames,
    /// and a start past the end is pulled down to it.
    ///
    /// When the end handle lands exactly on a frame boundary, the frame after it is excluded,
    /// so 70% of 10 frames ends at index 6. A plain `floor` of the end position would keep index 7.
    pub fn did_end_trimming(&mut self, start_percentage: f64, end_percentage: f64) {
        self.previous_trim = None;
        let Some(settings) = &mut self.settings else {
            return;
        };
        let count = settings.frame_count();
        let end_index = index_before(count, end_percentage);
        let start_index = index_at(count, start_percentage).min(end_index);
        if let Err(err) = settings.set_range(start_index, end_index) {
            tracing::warn!("trim not applied: {err}");
            return;
        }
        tracing::debug!(start_index, end_index, "trimmed");
        self.player.set_start_media_index(start_index);
        self.player.set_end_media_index(end_index);
        self.player.cancel_playing_single_frame();
    }

    pub fn get_thumbnail(&self, index: usize) -> Option<Raster> {
        self.player.frame(index)
    }

    /// Invalid rates (not positive, or not finite) are ignored
    pub fn did_select_speed(&mut self, rate: f32) {
        if let Err(err) = PlaybackSettings::validate_rate(rate) {
            tracing::warn!("{err}");
            return;
        }
        if let Some(settings) = &mut self.settings {
            if let Err(err) = settings.set_rate(rate) {
                tracing::warn!("{err}");
                return;
            }
        }
        tracing::debug!(rate, "speed selected");
        self.player.set_rate(rate);
    }

    pub fn did_select_playback(&mut self, mode: PlaybackMode) {
        if let Some(settings) = &mut self.settings {
            settings.set_mode(mode);
        }
        tracing::debug!(%mode, "playback selected");
        self.player.set_playback_mode(mode);
    }
}

impl<P> Drop for GifMakerHandler<P> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.generation.fetch_add(1, SeqCst);
            pending.finish(false);
        }
    }
}

fn scaled_position(count: usize, percentage: f64) -> f64 {
    count as f64 * percentage / 100.
}

/// Index of the frame starting at `percentage` of the sequence
fn index_at(count: usize, percentage: f64) -> usize {
    clamp_index(scaled_position(count, percentage).floor(), count)
}

/// Index of the last frame ending at or before `percentage` of the sequence.
///
/// Differs from `floor(count * percentage / 100)` only at exact frame boundaries, where it's one less.
fn index_before(count: usize, percentage: f64) -> usize {
    clamp_index(scaled_position(count, percentage).ceil() - 1., count)
}

fn clamp_index(position: f64, count: usize) -> usize {
    let last = count.saturating_sub(1);
    if position.is_nan() || position <= 0. {
        0
    } else {
        (position as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_positions() {
        assert_eq!(index_at(10, 20.), 2);
        assert_eq!(index_before(10, 70.), 6);
        assert_eq!(index_at(10, 0.), 0);
        assert_eq!(index_before(10, 100.), 9);
        assert_eq!(index_at(10, -5.), 0);
        assert_eq!(index_before(10, 250.), 9);
        assert_eq!(index_at(10, 100.), 9);
        assert_eq!(index_before(10, 0.), 0);
        assert_eq!(index_at(10, f64::NAN), 0);
    }
}
