//! Small CPU kernels shared by the built-in operators.

use image::{Rgb, RgbImage};
use imageproc::filter::Kernel;

use crate::foundation::error::{AugsweepError, AugsweepResult};

/// Normalized box kernel of `len` taps in Q16.
pub fn box_kernel_q16(len: u32) -> AugsweepResult<Vec<u32>> {
    if len == 0 {
        return Err(AugsweepError::operator("box kernel needs at least one tap"));
    }
    let base = 65536 / len;
    let mut weights = vec![base; len as usize];
    let delta = 65536 - base * len;
    let mid = weights.len() / 2;
    weights[mid] += delta;
    Ok(weights)
}

/// Separable Q16 convolution, horizontal then vertical, clamping at the borders.
///
/// Taps are centered on index `len / 2`.
pub fn separable_q16(src: &RgbImage, kernel: &[u32]) -> RgbImage {
    if kernel.len() <= 1 {
        return src.clone();
    }
    let (w, h) = src.dimensions();
    let mut tmp = RgbImage::new(w, h);
    let mut out = RgbImage::new(w, h);
    horizontal_pass(src, &mut tmp, kernel);
    vertical_pass(&tmp, &mut out, kernel);
    out
}

fn horizontal_pass(src: &RgbImage, dst: &mut RgbImage, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(src.width());
    for (x, y, px) in dst.enumerate_pixels_mut() {
        let mut acc = [0u64; 3];
        for (ki, &kw) in k.iter().enumerate() {
            let sx = (i64::from(x) + ki as i64 - radius).clamp(0, w - 1) as u32;
            let s = src.get_pixel(sx, y);
            for c in 0..3 {
                acc[c] += u64::from(kw) * u64::from(s[c]);
            }
        }
        *px = Rgb([q16_to_u8(acc[0]), q16_to_u8(acc[1]), q16_to_u8(acc[2])]);
    }
}

fn vertical_pass(src: &RgbImage, dst: &mut RgbImage, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let h = i64::from(src.height());
    for (x, y, px) in dst.enumerate_pixels_mut() {
        let mut acc = [0u64; 3];
        for (ki, &kw) in k.iter().enumerate() {
            let sy = (i64::from(y) + ki as i64 - radius).clamp(0, h - 1) as u32;
            let s = src.get_pixel(x, sy);
            for c in 0..3 {
                acc[c] += u64::from(kw) * u64::from(s[c]);
            }
        }
        *px = Rgb([q16_to_u8(acc[0]), q16_to_u8(acc[1]), q16_to_u8(acc[2])]);
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

/// Square `size`×`size` float correlation (row-major kernel), clamping at the borders.
pub fn convolve(src: &RgbImage, kernel: &[f32], size: usize) -> AugsweepResult<RgbImage> {
    let side = u32::try_from(size).unwrap_or(0);
    if side == 0 || kernel.len() != size * size {
        return Err(AugsweepError::operator(format!(
            "kernel of {} taps is not {size}x{size}",
            kernel.len()
        )));
    }
    Ok(Kernel::new(kernel, side, side).filter(src, |c: &mut u8, acc: f32| *c = to_u8(acc)))
}

/// `(1 - alpha) * a + alpha * b`, per channel. Images must share dimensions.
pub fn blend(a: &RgbImage, b: &RgbImage, alpha: f32) -> AugsweepResult<RgbImage> {
    if a.dimensions() != b.dimensions() {
        return Err(AugsweepError::operator("blend of mismatched image sizes"));
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = a.clone();
    for (o, s) in out.pixels_mut().zip(b.pixels()) {
        for c in 0..3 {
            o[c] = to_u8(f32::from(o[c]) * (1.0 - alpha) + f32::from(s[c]) * alpha);
        }
    }
    Ok(out)
}

/// Apply `f` to every channel value.
pub fn map_channels(mut img: RgbImage, f: impl Fn(f32) -> f32) -> RgbImage {
    for px in img.pixels_mut() {
        for c in 0..3 {
            px[c] = to_u8(f(f32::from(px[c])));
        }
    }
    img
}

/// Round and clamp into `0..=255`.
pub fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Rec. 601 luma.
pub fn luma(px: &Rgb<u8>) -> f32 {
    0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2])
}

#[cfg(test)]
#[path = "../../tests/unit/ops/kernel.rs"]
mod tests;
