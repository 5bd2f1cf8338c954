use super::*;
use crate::assets::decode::SourceImage;
use crate::effects::motion::MotionEffect;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Fps, FrameSize};

fn stripes(seed: u8) -> SourceImage {
    let img = image::RgbImage::from_fn(12, 9, |x, y| {
        image::Rgb([seed.wrapping_mul(37), (x * 20) as u8, (y * 25) as u8])
    });
    SourceImage::from_rgb_image(format!("stripes{seed}"), img).unwrap()
}

fn job(n: u8, duration: f64, effect: MotionEffect) -> RenderJob {
    RenderJob::uniform(
        (0..n).map(stripes).collect(),
        FrameSize::new(16, 10).unwrap(),
        Fps::integer(10).unwrap(),
        duration,
        effect,
    )
    .unwrap()
}

#[derive(Default)]
struct Recorder(Vec<(usize, usize)>);

impl RenderObserver for Recorder {
    fn on_slide_rendered(&mut self, index: usize, total: usize) {
        self.0.push((index, total));
    }
}

struct FailAt {
    fail_at: u64,
    pushed: u64,
    aborted: bool,
}

impl FrameSink for FailAt {
    fn begin(&mut self, _cfg: SinkConfig) -> ReelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &Arc<FrameRgb8>) -> ReelResult<()> {
        if idx.0 == self.fail_at {
            return Err(ReelError::encode("disk full"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn sequential_and_parallel_streams_match() {
    for effect in MotionEffect::ALL {
        let j = job(3, 1.0, effect);

        let mut seq = InMemorySink::new();
        let stats = render_job(&j, &RenderOpts::default(), &mut seq).unwrap();
        assert_eq!(stats.frames_total, 30);

        let opts = RenderOpts {
            parallel: true,
            threads: Some(3),
            chunk_size: 7,
            ..RenderOpts::default()
        };
        let mut par = InMemorySink::new();
        render_job(&j, &opts, &mut par).unwrap();

        assert_eq!(seq.frames().len(), par.frames().len());
        for (i, ((ia, a), (ib, b))) in seq.frames().iter().zip(par.frames()).enumerate() {
            assert_eq!(ia.0, i as u64);
            assert_eq!(ia, ib);
            assert_eq!(a.data, b.data, "{effect} frame {i}");
        }
        assert!(par.is_finished());
    }
}

#[test]
fn static_slides_reuse_their_composite() {
    let stats = render_job(&job(2, 1.0, MotionEffect::None), &RenderOpts::default(), &mut InMemorySink::new())
        .unwrap();
    assert_eq!(stats.frames_total, 20);
    assert_eq!(stats.frames_rendered, 0);
    assert_eq!(stats.slides, 2);

    let stats = render_job(&job(2, 1.0, MotionEffect::ZoomIn), &RenderOpts::default(), &mut InMemorySink::new())
        .unwrap();
    assert_eq!(stats.frames_rendered, 20);
}

#[test]
fn observer_hears_each_slide_once_in_order() {
    let mut rec = Recorder::default();
    let opts = RenderOpts {
        parallel: true,
        chunk_size: 4,
        ..RenderOpts::default()
    };
    render_job_observed(&job(3, 0.5, MotionEffect::SlideLeft), &opts, &mut InMemorySink::new(), &mut rec)
        .unwrap();
    assert_eq!(rec.0, vec![(0, 3), (1, 3), (2, 3)]);
}

#[test]
fn sink_failure_aborts_and_surfaces_encode_error() {
    let mut sink = FailAt {
        fail_at: 5,
        pushed: 0,
        aborted: false,
    };
    let opts = RenderOpts {
        chunk_size: 2,
        ..RenderOpts::default()
    };
    let err = render_job(&job(2, 1.0, MotionEffect::ZoomOut), &opts, &mut sink).unwrap_err();
    assert!(matches!(err, ReelError::EncodeFailure(_)), "{err}");
    assert_eq!(sink.pushed, 5);
    assert!(sink.aborted);
}

#[test]
fn cancelled_token_stops_before_any_frame() {
    let token = CancelToken::new();
    token.cancel();
    let opts = RenderOpts {
        cancel: Some(token),
        ..RenderOpts::default()
    };
    let mut sink = InMemorySink::new();
    let err = render_job(&job(1, 1.0, MotionEffect::None), &opts, &mut sink).unwrap_err();
    assert!(matches!(err, ReelError::Cancelled));
    assert!(sink.frames().is_empty());
    assert!(sink.is_aborted());
    assert!(!sink.is_finished());
}

#[test]
fn zero_threads_is_rejected() {
    let opts = RenderOpts {
        parallel: true,
        threads: Some(0),
        ..RenderOpts::default()
    };
    let err = render_job(&job(1, 1.0, MotionEffect::None), &opts, &mut InMemorySink::new())
        .unwrap_err();
    assert!(err.is_invalid_config());
}

#[test]
fn single_frame_preview_matches_the_stream() {
    let j = job(2, 1.0, MotionEffect::ZoomIn);
    let mut sink = InMemorySink::new();
    render_job(&j, &RenderOpts::default(), &mut sink).unwrap();

    let preview = render_frame_at(&j, 1.3).unwrap();
    assert_eq!(preview.data, sink.frames()[13].1.data);
    assert!(render_frame_at(&j, 2.0).is_err());
}

#[test]
fn short_inexact_slides_all_reach_the_sink() {
    let images = (0..4).map(stripes).collect();
    let j = RenderJob::uniform(
        images,
        FrameSize::new(16, 10).unwrap(),
        Fps::integer(10).unwrap(),
        0.1,
        MotionEffect::None,
    )
    .unwrap();

    let mut sink = InMemorySink::new();
    let mut rec = Recorder::default();
    render_job_observed(&j, &RenderOpts::default(), &mut sink, &mut rec).unwrap();
    assert_eq!(sink.frames().len(), 4);
    for (k, (_, frame)) in sink.frames().iter().enumerate() {
        let expected = Timeline::new(&j).renderer(k).unwrap().layers().composite.clone();
        assert_eq!(frame.data, expected.data, "frame {k} shows the wrong slide");
    }
    assert_eq!(rec.0, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
}

#[test]
fn range_render_keeps_timeline_indices() {
    let j = job(3, 1.0, MotionEffect::ZoomIn);
    let mut full = InMemorySink::new();
    render_job(&j, &RenderOpts::default(), &mut full).unwrap();

    let range = FrameRange::new(FrameIndex(8), FrameIndex(23)).unwrap();
    for parallel in [false, true] {
        let opts = RenderOpts {
            parallel,
            chunk_size: 4,
            ..RenderOpts::default()
        };
        let mut part = InMemorySink::new();
        let stats = render_range(&j, range, &opts, &mut part).unwrap();
        assert_eq!(stats.frames_total, 15);
        assert!(part.is_finished());
        for (n, (idx, frame)) in part.frames().iter().enumerate() {
            assert_eq!(idx.0, 8 + n as u64);
            assert_eq!(frame.data, full.frames()[idx.0 as usize].1.data);
        }
    }
}

#[test]
fn empty_or_overlong_ranges_are_rejected() {
    let j = job(2, 1.0, MotionEffect::None);
    let empty = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    assert!(
        render_range(&j, empty, &RenderOpts::default(), &mut InMemorySink::new())
            .unwrap_err()
            .is_invalid_config()
    );
    let past = FrameRange::new(FrameIndex(10), FrameIndex(21)).unwrap();
    assert!(
        render_range(&j, past, &RenderOpts::default(), &mut InMemorySink::new())
            .unwrap_err()
            .is_invalid_config()
    );
}
