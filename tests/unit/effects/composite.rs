use super::*;

fn solid(w: u32, h: u32, rgb: [u8; 3]) -> SourceImage {
    SourceImage::from_rgb_image("solid", image::RgbImage::from_pixel(w, h, image::Rgb(rgb)))
        .unwrap()
}

#[test]
fn composite_has_frame_size_for_any_ratio() {
    for size in [
        FrameSize::new(64, 36).unwrap(),
        FrameSize::new(36, 64).unwrap(),
        FrameSize::new(40, 40).unwrap(),
    ] {
        for (w, h) in [(10, 80), (80, 10), (33, 33), (640, 360)] {
            let layers = composite_slide(&solid(w, h, [1, 2, 3]), size, BlurSettings::default())
                .unwrap();
            assert_eq!(layers.composite.size(), size);
            assert_eq!(layers.background.size(), size);
        }
    }
}

#[test]
fn portrait_source_leaves_symmetric_side_margins() {
    // Aspect 0.5 into a 16:9 frame: contain on height, margins on both sides.
    let size = FrameSize::new(64, 36).unwrap();
    let layers = composite_slide(&solid(18, 36, [250, 0, 0]), size, BlurSettings::default())
        .unwrap();
    assert_eq!(
        layers.placement,
        Placement {
            x: 23,
            y: 0,
            width: 18,
            height: 36
        }
    );
    let right_margin = size.width - layers.placement.x - layers.placement.width;
    assert_eq!(right_margin, layers.placement.x);
    // Foreground pixels are placed verbatim.
    assert_eq!(layers.composite.pixel(23, 0), [250, 0, 0]);
    assert_eq!(layers.composite.pixel(40, 35), [250, 0, 0]);
    // Margins show the backdrop.
    assert_eq!(layers.composite.pixel(0, 10), layers.background.pixel(0, 10));
    assert_eq!(layers.composite.pixel(63, 10), layers.background.pixel(63, 10));
}

#[test]
fn foreground_keeps_source_aspect_within_a_pixel() {
    let size = FrameSize::new(96, 54).unwrap();
    let (w, h) = (123u32, 77u32);
    let layers = composite_slide(&solid(w, h, [9, 9, 9]), size, BlurSettings::default()).unwrap();
    let p = layers.placement;
    let expected_w = f64::from(p.height) * f64::from(w) / f64::from(h);
    assert!((f64::from(p.width) - expected_w).abs() <= 1.0);
    assert!(p.width == size.width || p.height == size.height);
}

#[test]
fn place_opaque_replaces_and_rejects_overflow() {
    let base = FrameRgb8::filled(FrameSize::new(4, 3).unwrap(), [0, 0, 0]);
    let fg = image::RgbImage::from_pixel(2, 2, image::Rgb([7, 8, 9]));

    let out = place_opaque(&base, &fg, 1, 1).unwrap();
    assert_eq!(out.pixel(0, 0), [0, 0, 0]);
    assert_eq!(out.pixel(1, 1), [7, 8, 9]);
    assert_eq!(out.pixel(2, 2), [7, 8, 9]);
    assert_eq!(out.pixel(3, 2), [0, 0, 0]);
    // The base frame is left untouched.
    assert!(base.data.iter().all(|&b| b == 0));

    assert!(place_opaque(&base, &fg, 3, 0).is_err());
}
