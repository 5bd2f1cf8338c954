use super::*;
use crate::assets::decode::SourceImage;
use crate::effects::motion::MotionEffect;
use crate::foundation::core::Fps;

fn solid(rgb: [u8; 3]) -> SourceImage {
    SourceImage::from_rgb_image("solid", image::RgbImage::from_pixel(8, 8, image::Rgb(rgb)))
        .unwrap()
}

fn job(n: usize, duration: f64) -> RenderJob {
    let images = (0..n).map(|i| solid([i as u8 * 40, 0, 0])).collect();
    RenderJob::uniform(
        images,
        FrameSize::new(8, 8).unwrap(),
        Fps::integer(24).unwrap(),
        duration,
        MotionEffect::None,
    )
    .unwrap()
}

#[test]
fn routes_half_open_intervals_with_boundaries_to_the_next_slide() {
    let tl = Timeline::new(&job(4, 3.0));
    assert_eq!(tl.slide_count(), 4);
    for k in 0..4usize {
        let start = 3.0 * k as f64;
        assert_eq!(tl.locate(start).unwrap(), (k, 0.0));
        assert_eq!(tl.locate(start + 1.5).unwrap(), (k, 1.5));
        let (slide, local) = tl.locate(start + 2.999).unwrap();
        assert_eq!(slide, k);
        assert!(local < 3.0);
    }
}

#[test]
fn routes_every_frame_time_of_a_two_slide_job() {
    let tl = Timeline::new(&job(2, 3.0));
    let fps = Fps::integer(24).unwrap();
    for i in 0..144u64 {
        let t = fps.frame_time_secs(crate::foundation::core::FrameIndex(i));
        let (slide, _) = tl.locate(t).unwrap();
        assert_eq!(slide, if i < 72 { 0 } else { 1 }, "frame {i}");
    }
}

#[test]
fn uneven_durations_use_cumulative_starts() {
    let images = vec![solid([0, 0, 0]), solid([1, 1, 1]), solid([2, 2, 2])];
    let slides = images
        .into_iter()
        .zip([0.5, 2.0, 1.0])
        .map(|(img, d)| SlideSpec::new(img, d, MotionEffect::None).unwrap())
        .collect();
    let j = RenderJob::new(FrameSize::new(8, 8).unwrap(), Fps::default(), slides).unwrap();
    let tl = Timeline::new(&j);

    assert_eq!(tl.total_duration_secs(), 3.5);
    assert_eq!(tl.slide_start_secs(2), Some(2.5));
    assert_eq!(tl.locate(0.49).unwrap().0, 0);
    assert_eq!(tl.locate(0.5).unwrap(), (1, 0.0));
    assert_eq!(tl.locate(2.5).unwrap(), (2, 0.0));
    assert_eq!(tl.locate(3.4).unwrap().0, 2);
}

#[test]
fn times_outside_the_timeline_are_rejected() {
    let tl = Timeline::new(&job(2, 1.0));
    assert!(tl.locate(-0.001).is_err());
    assert!(tl.locate(2.0).is_err());
    assert!(tl.locate(f64::NAN).is_err());
}

#[test]
fn frames_come_from_the_owning_slide() {
    let tl = Timeline::new(&job(3, 1.0));
    for k in 0..3 {
        let f = tl.frame_at(k as f64 + 0.25).unwrap();
        assert_eq!(f.pixel(4, 4), [k as u8 * 40, 0, 0]);
    }
}

#[test]
fn renderers_build_lazily_and_evict() {
    let mut tl = Timeline::new(&job(2, 1.0));
    assert!(!tl.is_built(0));
    tl.frame_at(0.0).unwrap();
    assert!(tl.is_built(0));
    assert!(!tl.is_built(1));

    tl.evict(0);
    assert!(!tl.is_built(0));
    // Rebuilt on demand with identical pixels.
    let again = tl.frame_at(0.0).unwrap();
    assert_eq!(again.pixel(0, 0), [0, 0, 0]);
    assert!(tl.renderer(5).is_err());
}

#[test]
fn inexact_durations_give_every_slide_its_boundary_frame() {
    // 0.1 s has no exact binary form; summed starts drift above k / 10.
    let images = (0..4).map(|i| solid([i as u8 * 40, 0, 0])).collect();
    let j = RenderJob::uniform(
        images,
        FrameSize::new(8, 8).unwrap(),
        Fps::integer(10).unwrap(),
        0.1,
        MotionEffect::None,
    )
    .unwrap();
    let tl = Timeline::new(&j);
    assert_eq!(j.total_frames(), 4);

    let fps = Fps::integer(10).unwrap();
    let routed: Vec<usize> = (0..4u64)
        .map(|i| tl.locate_frame(crate::foundation::core::FrameIndex(i)).unwrap().0)
        .collect();
    assert_eq!(routed, vec![0, 1, 2, 3]);
    for i in 0..4u64 {
        let t = fps.frame_time_secs(crate::foundation::core::FrameIndex(i));
        assert_eq!(tl.locate(t).unwrap(), (i as usize, 0.0), "t = {t}");
    }
    assert_eq!(
        tl.slide_start_frame(3),
        Some(crate::foundation::core::FrameIndex(3))
    );
    assert!(tl.locate_frame(crate::foundation::core::FrameIndex(4)).is_err());
}

#[test]
fn frames_route_like_times_for_thirds_at_ntsc_rate() {
    let images = (0..6).map(|i| solid([i as u8 * 40, 0, 0])).collect();
    let j = RenderJob::uniform(
        images,
        FrameSize::new(8, 8).unwrap(),
        Fps::new(30000, 1001).unwrap(),
        1.0 / 3.0,
        MotionEffect::None,
    )
    .unwrap();
    let tl = Timeline::new(&j);
    let mut seen = vec![0u32; 6];
    for i in 0..j.total_frames() {
        let (k, local) = tl.locate_frame(crate::foundation::core::FrameIndex(i)).unwrap();
        assert!((0.0..1.0 / 3.0).contains(&local));
        seen[k] += 1;
    }
    assert!(seen.iter().all(|&n| n > 0), "{seen:?}");
}
