//! Captured media and the frames it expands into
//!
//! A [`Segment`] is one unit of captured media: a still image or a reference to a clip.
//! Loading turns every segment into zero or more [`MediaFrame`]s, and the loaded frames
//! are handed back to the editor re-wrapped as image segments.

pub use imgref::ImgVec;
pub use rgb::RGBA8;

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "png")]
use crate::error::{Error, GifResult};

/// Decoded pixels. Shared, never mutated after decoding.
pub type Raster = Arc<ImgVec<RGBA8>>;

/// Where a segment came from
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MediaSource {
    #[default]
    Camera,
    Library,
    /// Frame of a loaded GIF, re-wrapped as a still
    GifMaker,
}

#[derive(Debug, Clone)]
pub enum Segment {
    Image {
        image: Raster,
        /// Display time in seconds. The loader's default is used if it's not set.
        interval: Option<f64>,
        source: MediaSource,
    },
    /// A clip on disk. Its duration is only known after decoding.
    Video {
        path: PathBuf,
    },
}

/// One image of the unified timeline
#[derive(Debug, Clone)]
pub struct MediaFrame {
    pub image: Raster,
    /// How long the frame stays on screen, in seconds
    pub interval: f64,
}

impl Segment {
    #[inline]
    pub fn image(image: ImgVec<RGBA8>, interval: Option<f64>) -> Self {
        Self::Image {
            image: Arc::new(image),
            interval,
            source: MediaSource::Camera,
        }
    }

    #[inline]
    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self::Video { path: path.into() }
    }

    /// Read and decode a PNG file from disk.
    #[cfg(feature = "png")]
    pub fn png_file(path: &Path, interval: Option<f64>) -> GifResult<Self> {
        let image = lodepng::decode32_file(path)
            .map_err(|err| Error::PNG(format!("Can't load {}: {}", path.display(), err)))?;
        Ok(Self::Image {
            image: Arc::new(ImgVec::new(image.buffer, image.width, image.height)),
            interval,
            source: MediaSource::Library,
        })
    }

    pub fn video_path(&self) -> Option<&Path> {
        match self {
            Self::Video { path } => Some(path),
            Self::Image { .. } => None,
        }
    }

    /// True for stills that will fall back to the default display time
    #[inline]
    pub fn needs_default_interval(&self) -> bool {
        matches!(self, Self::Image { interval: None, .. })
    }

    /// The frame this segment stands for, if it's a still with a known display time.
    pub fn to_frame(&self) -> Option<MediaFrame> {
        match self {
            Self::Image { image, interval: Some(interval), .. } => Some(MediaFrame {
                image: image.clone(),
                interval: *interval,
            }),
            _ => None,
        }
    }
}

impl MediaFrame {
    #[inline]
    pub fn new(image: Raster, interval: f64) -> Self {
        Self { image, interval }
    }

    /// Wraps this frame as a still segment tagged as GIF maker output
    pub fn to_segment(&self) -> Segment {
        Segment::Image {
            image: self.image.clone(),
            interval: Some(self.interval),
            source: MediaSource::GifMaker,
        }
    }
}
