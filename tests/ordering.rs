use gifmaker::*;
use imgref::ImgVec;
use proptest::prelude::*;
use rgb::RGBA8;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Clip paths are `<index>/<frames>/<delay ms>`
struct DelayedEncoder;
struct CountingDecoder;

fn clip_params(path: &Path) -> Option<(u8, u8, u64)> {
    let mut parts = path.to_str()?.split('/');
    Some((parts.next()?.parse().ok()?, parts.next()?.parse().ok()?, parts.next()?.parse().ok()?))
}

impl AnimationEncoder for DelayedEncoder {
    fn encode(&self, video: &Path, _: Repeat, _: f32) -> Option<AnimationResource> {
        let (_, _, delay) = clip_params(video)?;
        std::thread::sleep(Duration::from_millis(delay));
        Some(AnimationResource::new(video))
    }
}

impl AnimationDecoder for CountingDecoder {
    fn decode(&self, resource: &AnimationResource) -> Vec<MediaFrame> {
        let Some((index, frames, _)) = clip_params(resource.path()) else { return Vec::new() };
        (0..frames).map(|k| frame(index, k)).collect()
    }
}

fn frame(index: u8, k: u8) -> MediaFrame {
    MediaFrame::new(Arc::new(ImgVec::new(vec![RGBA8::new(index, k, 0, 255)], 1, 1)), 0.1)
}

#[derive(Debug, Clone)]
enum Input {
    Still,
    Clip { frames: u8, delay_ms: u64 },
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Still),
        (0u8..4, 0u64..25).prop_map(|(frames, delay_ms)| Input::Clip { frames, delay_ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn output_order_ignores_completion_order(inputs in prop::collection::vec(input(), 0..8)) {
        let mut segments = Vec::new();
        let mut expected = Vec::new();
        for (i, input) in inputs.iter().enumerate() {
            let i = i as u8;
            match *input {
                Input::Still => {
                    segments.push(Segment::Image { image: frame(i, 0).image, interval: None, source: MediaSource::Camera });
                    expected.push((i, 0));
                },
                Input::Clip { frames, delay_ms } => {
                    segments.push(Segment::video(format!("{i}/{frames}/{delay_ms}")));
                    expected.extend((0..frames).map(|k| (i, k)));
                },
            }
        }

        let aggregator = FrameAggregator::new(DelayedEncoder, CountingDecoder, LoaderSettings::default());
        let frames = aggregator.aggregate(&segments, 0.2).unwrap();
        let actual: Vec<_> = frames.iter().map(|f| (f.image.buf()[0].r, f.image.buf()[0].g)).collect();
        prop_assert_eq!(actual, expected);
    }
}
