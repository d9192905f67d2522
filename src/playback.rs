//! Playback-order transforms and the player collaborator

use crate::segment::{MediaFrame, Raster};
use crate::settings::PlaybackMode;

/// Divides every frame's display time by `rate`
pub fn scale_rate(frames: &[MediaFrame], rate: f32) -> Vec<MediaFrame> {
    let rate = f64::from(rate);
    frames.iter().map(|f| MediaFrame::new(f.image.clone(), f.interval / rate)).collect()
}

/// Reorders frames for the given mode.
///
/// Rebound of `[f0, f1, f2, f3]` is `[f0, f1, f2, f3, f2, f1]`.
/// Sequences of 2 frames or fewer come back unchanged in rebound mode.
pub fn apply_mode(mut frames: Vec<MediaFrame>, mode: PlaybackMode) -> Vec<MediaFrame> {
    match mode {
        PlaybackMode::Loop => frames,
        PlaybackMode::Reverse => {
            frames.reverse();
            frames
        },
        PlaybackMode::Rebound => {
            if frames.len() > 2 {
                let back = frames[1..frames.len() - 1].iter().rev().cloned().collect::<Vec<_>>();
                frames.extend(back);
            }
            frames
        },
    }
}

/// Rate scaling followed by the mode transform
pub fn frames_for_playback(frames: &[MediaFrame], rate: f32, mode: PlaybackMode) -> Vec<MediaFrame> {
    apply_mode(scale_rate(frames, rate), mode)
}

/// The live player that shows the edited GIF
///
/// [`GifMakerHandler`](crate::GifMakerHandler) is the only caller of the setters,
/// and keeps them in sync with its [`PlaybackSettings`](crate::PlaybackSettings).
pub trait MediaPlayer {
    /// Replaces what's shown with `frames`, resetting the range to all of them.
    /// Empty when the handler is cleared.
    fn set_frames(&mut self, frames: Vec<MediaFrame>);

    fn rate(&self) -> f32;
    fn set_rate(&mut self, rate: f32);

    fn playback_mode(&self) -> PlaybackMode;
    fn set_playback_mode(&mut self, mode: PlaybackMode);

    fn start_media_index(&self) -> usize;
    fn set_start_media_index(&mut self, index: usize);

    fn end_media_index(&self) -> usize;
    fn set_end_media_index(&mut self, index: usize);

    /// Pauses on the frame at `at` (0 to 1) of the whole sequence
    fn play_single_frame(&mut self, at: f64);

    /// Resumes normal playback after [`MediaPlayer::play_single_frame`]
    fn cancel_playing_single_frame(&mut self);

    fn frame(&self, index: usize) -> Option<Raster>;
}

/// In-memory [`MediaPlayer`] over a list of frames
#[derive(Debug, Clone)]
pub struct FramePlayer {
    frames: Vec<MediaFrame>,
    rate: f32,
    mode: PlaybackMode,
    start_index: usize,
    end_index: usize,
    single_frame: Option<usize>,
}

impl Default for FramePlayer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FramePlayer {
    pub fn new(frames: Vec<MediaFrame>) -> Self {
        let end_index = frames.len().saturating_sub(1);
        Self {
            frames,
            rate: 1.,
            mode: PlaybackMode::Loop,
            start_index: 0,
            end_index,
            single_frame: None,
        }
    }

    pub fn frames(&self) -> &[MediaFrame] {
        &self.frames
    }

    /// Index of the frame being previewed, if playback is paused on one
    pub fn single_frame(&self) -> Option<usize> {
        self.single_frame
    }

    /// What the player currently shows in a loop: the trimmed range, rescaled and reordered
    pub fn playback_frames(&self) -> Vec<MediaFrame> {
        if self.frames.is_empty() {
            return Vec::new();
        }
        let end = self.end_index.min(self.frames.len() - 1);
        let start = self.start_index.min(end);
        frames_for_playback(&self.frames[start..=end], self.rate, self.mode)
    }
}

impl MediaPlayer for FramePlayer {
    fn set_frames(&mut self, frames: Vec<MediaFrame>) {
        self.start_index = 0;
        self.end_index = frames.len().saturating_sub(1);
        self.single_frame = None;
        self.frames = frames;
    }

    fn rate(&self) -> f32 {
        self.rate
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    fn playback_mode(&self) -> PlaybackMode {
        self.mode
    }

    fn set_playback_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }

    fn start_media_index(&self) -> usize {
        self.start_index
    }

    fn set_start_media_index(&mut self, index: usize) {
        self.start_index = index;
    }

    fn end_media_index(&self) -> usize {
        self.end_index
    }

    fn set_end_media_index(&mut self, index: usize) {
        self.end_index = index;
    }

    fn play_single_frame(&mut self, at: f64) {
        if self.frames.is_empty() {
            return;
        }
        let last = self.frames.len() - 1;
        let index = (self.frames.len() as f64 * at).floor().max(0.) as usize;
        self.single_frame = Some(index.min(last));
    }

    fn cancel_playing_single_frame(&mut self) {
        self.single_frame = None;
    }

    fn frame(&self, index: usize) -> Option<Raster> {
        self.frames.get(index).map(|f| f.image.clone())
    }
}
