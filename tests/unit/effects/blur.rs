use super::*;

#[test]
fn blur_sigma_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6];
    let out = blur_rgb8(&src, 1, 2, 0.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8];
    let src = px.repeat((w * h) as usize);
    let out = blur_rgb8(&src, w, h, 1.5).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h * 3) as usize];
    let center = ((4 * w + 4) * 3) as usize;
    src[center..center + 3].copy_from_slice(&[255, 255, 255]);

    let out = blur_rgb8(&src, w, h, 1.0).unwrap();

    let nonzero = out.chunks_exact(3).filter(|px| px[0] != 0).count();
    assert!(nonzero > 1);
    assert!(out[center] < 255);

    let sum_r: u32 = out.chunks_exact(3).map(|px| u32::from(px[0])).sum();
    assert!((sum_r as i32 - 255).abs() <= 30);
}

#[test]
fn blur_rejects_mismatched_buffer() {
    assert!(blur_rgb8(&[0u8; 5], 1, 2, 1.0).is_err());
}

#[test]
fn kernel_radius_covers_three_sigma() {
    assert_eq!(kernel_radius(0.0), 0);
    assert_eq!(kernel_radius(1.0), 3);
    assert_eq!(kernel_radius(20.0), 60);
    assert_eq!(kernel_radius(f32::NAN), 0);
}

#[test]
fn kernel_sums_to_one_in_q16() {
    let k = gaussian_kernel_q16(6, 2.0).unwrap();
    assert_eq!(k.len(), 13);
    assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
}
