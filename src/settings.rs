//! Non-destructive edit parameters of a loaded frame sequence

use crate::error::{Error, GifResult};
use std::fmt;
use std::str::FromStr;

/// How the trimmed frames are ordered during playback
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Forward, then start over
    #[default]
    Loop,
    /// Backward
    Reverse,
    /// Forward then backward, without showing the end frames twice
    Rebound,
}

impl PlaybackMode {
    pub const ALL: [Self; 3] = [Self::Loop, Self::Reverse, Self::Rebound];

    pub fn name(self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Reverse => "reverse",
            Self::Rebound => "rebound",
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlaybackMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnsupportedInput(format!("Unknown playback mode '{s}'; use loop, reverse or rebound")))
    }
}

/// Speed, trim range and mode for one loaded frame sequence
///
/// Writes are validated: `0 <= start_index <= end_index < frame_count` and `rate > 0`.
/// A rejected write leaves the settings unchanged.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaybackSettings {
    rate: f32,
    start_index: usize,
    end_index: usize,
    mode: PlaybackMode,
    frame_count: usize,
}

impl PlaybackSettings {
    /// Defaults for a sequence of `frame_count` frames: normal speed, untrimmed, looping.
    ///
    /// `frame_count` must not be 0.
    pub fn new(frame_count: usize) -> Self {
        debug_assert!(frame_count > 0);
        Self {
            rate: 1.,
            start_index: 0,
            end_index: frame_count.saturating_sub(1),
            mode: PlaybackMode::Loop,
            frame_count,
        }
    }

    /// Playback speed multiplier. Above 1 is faster.
    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// First frame of the trim range
    #[inline]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Last frame of the trim range (inclusive)
    #[inline]
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    #[inline]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Rates must be finite and above 0
    pub fn validate_rate(rate: f32) -> GifResult<f32> {
        if !rate.is_finite() || rate <= 0. {
            return Err(Error::InvalidRate(rate));
        }
        Ok(rate)
    }

    pub fn set_rate(&mut self, rate: f32) -> GifResult<()> {
        self.rate = Self::validate_rate(rate)?;
        Ok(())
    }

    pub fn set_range(&mut self, start_index: usize, end_index: usize) -> GifResult<()> {
        if start_index > end_index || end_index >= self.frame_count {
            return Err(Error::TrimOutOfRange(start_index, end_index, self.frame_count));
        }
        self.start_index = start_index;
        self.end_index = end_index;
        Ok(())
    }

    #[inline]
    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }
}
