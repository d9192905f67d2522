//! Encoder and decoder collaborators used to turn clips into frames
//!
//! A clip is first encoded into an intermediate animated image at a fixed sampling rate,
//! and that image is then decoded into timed frames. Both steps are blocking; the
//! [`FrameAggregator`](crate::FrameAggregator) runs them on worker threads.

use crate::segment::MediaFrame;
pub use gif::Repeat;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// An intermediate animated image produced by an [`AnimationEncoder`]
///
/// If the encoder wrote it to a temporary file, the file is deleted when this is dropped.
#[derive(Debug)]
pub struct AnimationResource {
    path: PathBuf,
    _temp: Option<TempPath>,
}

impl AnimationResource {
    /// Refers to an existing file that outlives the resource
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _temp: None }
    }

    /// Takes ownership of a temporary file
    pub fn temporary(temp: TempPath) -> Self {
        Self { path: temp.to_path_buf(), _temp: Some(temp) }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Converts a clip into an animated image.
pub trait AnimationEncoder: Send + Sync {
    /// Samples the clip `frames_per_second` times per second.
    ///
    /// Returns `None` if no animation could be produced. The clip then contributes no frames.
    fn encode(&self, video: &Path, repeat: Repeat, frames_per_second: f32) -> Option<AnimationResource>;
}

/// Expands an animated image into its frames, in display order.
pub trait AnimationDecoder: Send + Sync {
    /// Undecodable input gives an empty list.
    fn decode(&self, resource: &AnimationResource) -> Vec<MediaFrame>;
}
