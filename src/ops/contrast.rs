use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::equalize_histogram;

use super::kernel::{convolve, luma, map_channels, to_u8};
use super::{OpContext, OperatorRegistry};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::sampler::ConcreteParams;

pub(super) fn register(reg: &mut OperatorRegistry) {
    reg.register_rgb("ContrastNormalization", &["alpha"], |p, img, _| {
        let alpha = p.require("alpha")? as f32;
        Ok(map_channels(img, |v| 128.0 + alpha * (v - 128.0)))
    });
    reg.register_rgb("HistogramEqualization", &[], histogram_equalization);
    reg.register_rgb("CLAHE", &["clip_limit"], clahe);
    reg.register_rgb("Sharpen", &["alpha"], sharpen);
    reg.register_rgb("Emboss", &["alpha"], emboss);
}

/// Equalize each channel independently.
fn histogram_equalization(
    _: &ConcreteParams,
    mut img: RgbImage,
    _: &mut OpContext,
) -> AugsweepResult<RgbImage> {
    let (w, h) = img.dimensions();
    for c in 0..3 {
        let plane = GrayImage::from_fn(w, h, |x, y| Luma([img.get_pixel(x, y)[c]]));
        let eq = equalize_histogram(&plane);
        for (x, y, px) in img.enumerate_pixels_mut() {
            px[c] = eq.get_pixel(x, y)[0];
        }
    }
    Ok(img)
}

/// Clipped, cumulative mapping for one tile. `clip_limit` is relative to a flat histogram.
fn tile_lut(
    plane: &GrayImage,
    (x0, x1): (u32, u32),
    (y0, y1): (u32, u32),
    clip_limit: f64,
) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[usize::from(plane.get_pixel(x, y)[0])] += 1;
        }
    }
    let n = (x1 - x0) * (y1 - y0);
    let mut lut = [0u8; 256];
    if n == 0 {
        return lut;
    }
    let limit = ((clip_limit * f64::from(n) / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for b in hist.iter_mut() {
        if *b > limit {
            excess += *b - limit;
            *b = limit;
        }
    }
    let (bonus, rest) = (excess / 256, (excess % 256) as usize);
    let mut cdf = 0u32;
    for (i, b) in hist.iter().enumerate() {
        cdf += b + bonus + u32::from(i < rest);
        lut[i] = to_u8(cdf as f32 * 255.0 / n as f32);
    }
    lut
}

/// Contrast-limited adaptive equalization of one plane on a `grid`×`grid` tiling, with
/// bilinear interpolation between neighboring tile mappings.
pub(crate) fn clahe_plane(plane: &GrayImage, grid: u32, clip_limit: f64) -> GrayImage {
    let (w, h) = plane.dimensions();
    let gx = grid.clamp(1, w.max(1));
    let gy = grid.clamp(1, h.max(1));
    let bound = |i: u32, g: u32, side: u32| (u64::from(i) * u64::from(side) / u64::from(g)) as u32;
    let mut luts = Vec::with_capacity((gx * gy) as usize);
    for ty in 0..gy {
        for tx in 0..gx {
            luts.push(tile_lut(
                plane,
                (bound(tx, gx, w), bound(tx + 1, gx, w)),
                (bound(ty, gy, h), bound(ty + 1, gy, h)),
                clip_limit,
            ));
        }
    }
    // tile index on the left/top, the one after it, and the weight of the latter
    let neighbors = |pos: u32, g: u32, side: u32| {
        let f = ((f64::from(pos) + 0.5) * f64::from(g) / f64::from(side) - 0.5).max(0.0);
        let lo = (f.floor() as u32).min(g - 1);
        let hi = (lo + 1).min(g - 1);
        (lo, hi, (f - f64::from(lo)).clamp(0.0, 1.0))
    };
    GrayImage::from_fn(w, h, |x, y| {
        let v = usize::from(plane.get_pixel(x, y)[0]);
        let (x0, x1, ax) = neighbors(x, gx, w);
        let (y0, y1, ay) = neighbors(y, gy, h);
        let at = |tx: u32, ty: u32| f64::from(luts[(ty * gx + tx) as usize][v]);
        let top = at(x0, y0) * (1.0 - ax) + at(x1, y0) * ax;
        let bottom = at(x0, y1) * (1.0 - ax) + at(x1, y1) * ax;
        Luma([to_u8((top * (1.0 - ay) + bottom * ay) as f32)])
    })
}

/// Equalize luminance with [`clahe_plane`] and shift every channel by the luminance change.
fn clahe(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let clip_limit = p.require("clip_limit")?;
    let grid = p.get_or("tile_grid_size", 8.0).round();
    if clip_limit <= 0.0 || !(1.0..=64.0).contains(&grid) {
        return Err(AugsweepError::operator(format!(
            "clahe needs clip_limit > 0 and a 1..=64 tile grid, got {clip_limit} and {grid}"
        )));
    }
    let (w, h) = img.dimensions();
    let plane = GrayImage::from_fn(w, h, |x, y| Luma([to_u8(luma(img.get_pixel(x, y)))]));
    let eq = clahe_plane(&plane, grid as u32, clip_limit);
    let mut out = img;
    for (x, y, px) in out.enumerate_pixels_mut() {
        let delta = f32::from(eq.get_pixel(x, y)[0]) - f32::from(plane.get_pixel(x, y)[0]);
        for c in 0..3 {
            px[c] = to_u8(f32::from(px[c]) + delta);
        }
    }
    Ok(out)
}

/// `(1 - alpha) * identity + alpha * k`, both 3x3.
fn mix_with_identity(k: [f32; 9], alpha: f32) -> [f32; 9] {
    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = k.map(|v| v * alpha);
    out[4] += 1.0 - alpha;
    out
}

fn sharpen(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let alpha = p.require("alpha")? as f32;
    let l = p.get_or("lightness", 1.0) as f32;
    #[rustfmt::skip]
    let k = [
        -1.0, -1.0, -1.0,
        -1.0, 8.0 + l, -1.0,
        -1.0, -1.0, -1.0,
    ];
    convolve(&img, &mix_with_identity(k, alpha), 3)
}

fn emboss(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let alpha = p.require("alpha")? as f32;
    let s = p.get_or("strength", 1.0) as f32;
    #[rustfmt::skip]
    let k = [
        -1.0 - s, -s, 0.0,
        -s, 1.0, s,
        0.0, s, 1.0 + s,
    ];
    convolve(&img, &mix_with_identity(k, alpha), 3)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/contrast.rs"]
mod tests;
