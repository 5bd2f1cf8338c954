use rayon::prelude::*;

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::{RGB8_CHANNELS, rgb8_len};

/// Kernel half-width used for a Gaussian of standard deviation `sigma`.
pub fn kernel_radius(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (3.0 * sigma).ceil() as u32
}

/// Separable Gaussian blur over tightly packed RGB8, clamping samples at the edges.
///
/// Weights are quantised to Q16 so results are bit-identical across runs and thread counts.
pub fn blur_rgb8(src: &[u8], width: u32, height: u32, sigma: f32) -> ReelResult<Vec<u8>> {
    let expected_len = rgb8_len(width, height)?;
    if src.len() != expected_len {
        return Err(ReelError::render(
            "blur_rgb8 expects src matching width*height*3",
        ));
    }
    let radius = kernel_radius(sigma);
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ReelResult<Vec<u32>> {
    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(ReelError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push rounding drift into the centre tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let stride = (width as usize) * RGB8_CHANNELS;
    dst.par_chunks_mut(stride)
        .zip(src.par_chunks(stride))
        .for_each(|(dst_row, src_row)| {
            for x in 0..w {
                let mut acc = [0u64; RGB8_CHANNELS];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i64 - radius).clamp(0, w - 1);
                    let idx = (sx as usize) * RGB8_CHANNELS;
                    for c in 0..RGB8_CHANNELS {
                        acc[c] += u64::from(kw) * u64::from(src_row[idx + c]);
                    }
                }
                let out_idx = (x as usize) * RGB8_CHANNELS;
                for c in 0..RGB8_CHANNELS {
                    dst_row[out_idx + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let h = i64::from(height);
    let stride = (width as usize) * RGB8_CHANNELS;
    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let mut acc = vec![0u64; stride];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y as i64 + ki as i64 - radius).clamp(0, h - 1) as usize;
                let src_row = &src[sy * stride..(sy + 1) * stride];
                for (a, &s) in acc.iter_mut().zip(src_row) {
                    *a += u64::from(kw) * u64::from(s);
                }
            }
            for (d, a) in dst_row.iter_mut().zip(acc) {
                *d = q16_to_u8(a);
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
