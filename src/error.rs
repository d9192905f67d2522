use std::io;
use quick_error::quick_error;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        /// Internal error
        ThreadSend {
            display("Internal error; unexpectedly aborted")
        }
        Aborted {
            display("aborted")
        }
        NoFrames {
            display("Found no usable frames to play")
        }
        Io(err: io::Error) {
            from()
            display("I/O: {}", err)
        }
        Gif(err: gif::DecodingError) {
            from()
            display("GIF decoding error: {}", err)
        }
        GifEncode(err: gif::EncodingError) {
            display("GIF encoding error: {}", err)
        }
        Dispose(err: gif_dispose::Error) {
            from()
            display("gif dispose error: {}", err)
        }
        PNG(msg: String) {
            display("{}", msg)
        }
        InvalidRate(rate: f32) {
            display("Playback rate must be a positive number, got {}", rate)
        }
        TrimOutOfRange(start: usize, end: usize, count: usize) {
            display("Trim range {}..={} doesn't fit {} frames", start, end, count)
        }
        UnsupportedInput(msg: String) {
            display("{}", msg)
        }
    }
}

pub type GifResult<T, E = Error> = Result<T, E>;

impl From<gif::EncodingError> for Error {
    #[cold]
    fn from(err: gif::EncodingError) -> Self {
        match err {
            gif::EncodingError::Io(err) => err.into(),
            other => Error::GifEncode(other),
        }
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for Error {
    #[cold]
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        Self::ThreadSend
    }
}

impl From<crossbeam_channel::RecvError> for Error {
    #[cold]
    fn from(_: crossbeam_channel::RecvError) -> Self {
        Self::Aborted
    }
}
