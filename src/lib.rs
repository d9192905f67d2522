/*
 gifmaker GIF editing core
 © 2026 gifmaker contributors

 This program is free software: you can redistribute it and/or modify
 it under the terms of the GNU Affero General Public License as
 published by the Free Software Foundation, either version 3 of the
 License, or (at your option) any later version.

 This program is distributed in the hope that it will be useful,
 but WITHOUT ANY WARRANTY; without even the implied warranty of
 MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 GNU Affero General Public License for more details.

 You should have received a copy of the GNU Affero General Public License
 along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Turns captured stills and clips into one editable GIF timeline.
//!
//! [`GifMakerHandler::load()`] merges [`Segment`]s into a sequence of [`MediaFrame`]s on a
//! background thread. Trim, speed and playback mode are then edited without touching
//! the loaded frames: [`GifMakerHandler::trimmed_segments()`] and
//! [`GifMakerHandler::frames_for_playback()`] derive what to export and what to play.

mod error;
pub use crate::error::*;
mod ordqueue;
mod minipool;
pub mod segment;
pub use crate::segment::{MediaFrame, MediaSource, Raster, Segment};
pub mod codec;
pub use crate::codec::{AnimationDecoder, AnimationEncoder, AnimationResource, Repeat};
mod decode;
pub use crate::decode::GifFrameDecoder;
mod encode;
pub use crate::encode::GifResampler;
mod aggregate;
pub use crate::aggregate::FrameAggregator;
mod settings;
pub use crate::settings::{PlaybackMode, PlaybackSettings};
pub mod playback;
pub use crate::playback::{FramePlayer, MediaPlayer};
mod handler;
pub use crate::handler::{GifMakerHandler, GifMakerHandlerDelegate};

/// How clips are sampled, and the fallback display time of stills
#[derive(Copy, Clone, Debug)]
pub struct LoaderSettings {
    /// Clips are sampled this many times per second. Defaults to 10.
    pub frames_per_second: f32,
    /// Looping of the intermediate animation. Defaults to forever.
    pub repeat: Repeat,
    /// Display time in seconds of stills that have none, if the delegate doesn't provide one
    pub default_image_interval: f64,
    /// Max number of clips converted at the same time
    pub max_threads: u8,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            frames_per_second: 10.,
            repeat: Repeat::Infinite,
            default_image_interval: 1. / 6.,
            max_threads: 16,
        }
    }
}
