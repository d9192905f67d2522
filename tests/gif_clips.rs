use gifmaker::*;
use imgref::ImgVec;
use rgb::RGBA8;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const COLORS: [[u8; 4]; 4] = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [255, 255, 255, 255]];

/// 4×4 solid-color frames, `delay` in 1/100s each
fn write_gif(colors: &[[u8; 4]], delay: u16) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
    {
        let mut enc = gif::Encoder::new(file.as_file_mut(), 4, 4, &[]).unwrap();
        enc.set_repeat(gif::Repeat::Infinite).unwrap();
        for color in colors {
            let mut pixels = color.repeat(16);
            let mut frame = gif::Frame::from_rgba_speed(4, 4, &mut pixels, 10);
            frame.delay = delay;
            enc.write_frame(&frame).unwrap();
        }
    }
    file.flush().unwrap();
    file
}

fn is_close(px: RGBA8, color: [u8; 4]) -> bool {
    [px.r, px.g, px.b].iter().zip(&color).all(|(&a, &b)| a.abs_diff(b) < 16)
}

#[test]
fn decoder_reads_every_frame() {
    let clip = write_gif(&COLORS, 7);
    let frames = GifFrameDecoder.decode(&AnimationResource::new(clip.path()));
    assert_eq!(frames.len(), 4);
    for (frame, color) in frames.iter().zip(COLORS) {
        assert_eq!((frame.image.width(), frame.image.height()), (4, 4));
        assert!(is_close(frame.image.buf()[0], color));
        assert!((frame.interval - 0.07).abs() < 1e-9);
    }
}

#[test]
fn zero_delays_play_at_browser_speed() {
    let clip = write_gif(&COLORS[..2], 0);
    let frames = GifFrameDecoder::read_file(clip.path()).unwrap();
    assert!(frames.iter().all(|f| (f.interval - 0.1).abs() < 1e-9));
}

#[test]
fn resampling_keeps_duration() {
    // 20fps source
    let clip = write_gif(&COLORS, 5);
    let resource = GifResampler.encode(clip.path(), Repeat::Infinite, 10.).unwrap();
    let frames = GifFrameDecoder.decode(&resource);
    assert_eq!(frames.len(), 2);
    assert!(is_close(frames[0].image.buf()[0], COLORS[0]));
    assert!(is_close(frames[1].image.buf()[0], COLORS[2]));
    assert!(frames.iter().all(|f| (f.interval - 0.1).abs() < 1e-9));
}

#[test]
fn slow_clips_are_not_padded() {
    // 4fps source, fewer frames than the sampling rate
    let clip = write_gif(&COLORS[..3], 25);
    let resource = GifResampler.encode(clip.path(), Repeat::Infinite, 10.).unwrap();
    let frames = GifFrameDecoder.decode(&resource);
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|f| (f.interval - 0.25).abs() < 1e-9));
}

#[test]
fn intermediate_file_is_removed_with_resource() {
    let clip = write_gif(&COLORS, 10);
    let resource = GifResampler.encode(clip.path(), Repeat::Infinite, 10.).unwrap();
    let path = resource.path().to_path_buf();
    assert!(path.exists());
    drop(resource);
    assert!(!path.exists());
}

#[test]
fn non_gif_clip_is_not_encoded() {
    let mut not_gif = NamedTempFile::new().unwrap();
    not_gif.write_all(b"this is not a movie").unwrap();
    assert!(GifResampler.encode(not_gif.path(), Repeat::Infinite, 10.).is_none());
    assert!(GifResampler.encode("/nonexistent/clip.gif".as_ref(), Repeat::Infinite, 10.).is_none());
}

#[test]
fn handler_merges_stills_and_gif_clips() {
    let clip = write_gif(&COLORS, 10);
    let still = Segment::image(ImgVec::new(vec![RGBA8::new(9, 9, 9, 255); 16], 4, 4), Some(0.5));
    let segments = vec![still.clone(), Segment::video(clip.path()), Segment::video("/nonexistent/clip.gif"), still];

    let mut handler = GifMakerHandler::with_player(FramePlayer::default());
    let loaded = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = loaded.clone();
    handler.load(segments, || {}, || {}, move |ok| flag.store(ok, std::sync::atomic::Ordering::SeqCst));
    handler.wait();
    assert!(loaded.load(std::sync::atomic::Ordering::SeqCst));

    let frames = handler.frames().unwrap();
    assert_eq!(frames.len(), 6);
    assert_eq!(frames[0].interval, 0.5);
    assert_eq!(frames[5].interval, 0.5);
    for (frame, color) in frames[1..5].iter().zip(COLORS) {
        assert!(is_close(frame.image.buf()[0], color));
    }
}
