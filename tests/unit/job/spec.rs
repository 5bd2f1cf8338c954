use super::*;

fn image() -> SourceImage {
    SourceImage::from_rgb_image("img", image::RgbImage::from_pixel(4, 4, image::Rgb([1, 1, 1])))
        .unwrap()
}

fn size() -> FrameSize {
    FrameSize::new(16, 16).unwrap()
}

#[test]
fn zero_images_is_invalid_configuration() {
    let err = RenderJob::new(size(), Fps::default(), Vec::new()).unwrap_err();
    assert!(err.is_invalid_config());
    let err = RenderJob::uniform(Vec::new(), size(), Fps::default(), 3.0, MotionEffect::None)
        .unwrap_err();
    assert!(err.is_invalid_config());
}

#[test]
fn non_positive_durations_are_rejected() {
    for d in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = SlideSpec::new(image(), d, MotionEffect::None).unwrap_err();
        assert!(err.is_invalid_config(), "duration {d}");
    }
}

#[test]
fn zoom_out_duration_ceiling_is_enforced() {
    assert!(SlideSpec::new(image(), 25.0, MotionEffect::ZoomOut).is_ok());
    assert!(
        SlideSpec::new(image(), 26.0, MotionEffect::ZoomOut)
            .unwrap_err()
            .is_invalid_config()
    );
    assert!(SlideSpec::new(image(), 60.0, MotionEffect::ZoomIn).is_ok());
}

#[test]
fn literal_sizes_are_still_validated() {
    let bad = FrameSize {
        width: 0,
        height: 10,
    };
    let slides = vec![SlideSpec::new(image(), 1.0, MotionEffect::None).unwrap()];
    assert!(
        RenderJob::new(bad, Fps::default(), slides)
            .unwrap_err()
            .is_invalid_config()
    );
}

#[test]
fn totals_follow_durations_and_fps() {
    let job = RenderJob::uniform(
        vec![image(), image()],
        size(),
        Fps::integer(24).unwrap(),
        3.0,
        MotionEffect::None,
    )
    .unwrap();
    assert_eq!(job.total_duration_secs(), 6.0);
    assert_eq!(job.total_frames(), 144);
    assert_eq!(job.slides().len(), 2);
}

#[test]
fn blur_override_is_validated() {
    let job = RenderJob::uniform(vec![image()], size(), Fps::default(), 1.0, MotionEffect::None)
        .unwrap();
    assert!(job.clone().with_blur(BlurSettings { radius: -1.0 }).is_err());
    let job = job.with_blur(BlurSettings { radius: 5.0 }).unwrap();
    assert_eq!(job.blur().radius, 5.0);
}
