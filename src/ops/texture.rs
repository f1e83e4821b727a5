use std::f64::consts::TAU;

use image::{GrayImage, Luma, RgbImage, imageops::FilterType};
use rand::Rng;

use super::kernel::to_u8;
use super::{OpContext, OperatorRegistry};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::sampler::ConcreteParams;

const MAX_GRID: f64 = 32.0;

pub(super) fn register(reg: &mut OperatorRegistry) {
    reg.register_rgb("FrequencyNoiseAlpha", &["exponent"], |p, img, ctx| {
        let exponent = p.require("exponent")?;
        let side = grid_side(p.get_or("size_px_max", 8.0))?;
        let mask = frequency_noise(side, exponent, ctx);
        Ok(modulate(img, &mask))
    });
    reg.register_rgb("SimplexNoiseAlpha", &["size_px_max"], |p, img, ctx| {
        let side = grid_side(p.require("size_px_max")?)?;
        let rng = ctx.rng();
        let coarse = GrayImage::from_fn(side, side, |_, _| Luma([rng.gen_range(0..=255u8)]));
        Ok(modulate(img, &coarse))
    });
}

fn grid_side(v: f64) -> AugsweepResult<u32> {
    let side = v.round();
    if !(2.0..=MAX_GRID).contains(&side) {
        return Err(AugsweepError::operator(format!(
            "noise size {v} is outside 2..={MAX_GRID}"
        )));
    }
    Ok(side as u32)
}

/// `side`×`side` noise whose amplitude at spatial frequency `f` is `f^exponent`, with random
/// phases, rescaled into `0..=255`.
pub(crate) fn frequency_noise(side: u32, exponent: f64, ctx: &mut OpContext) -> GrayImage {
    let n = side as usize;
    let signed = |k: usize| if k <= n / 2 { k as f64 } else { k as f64 - n as f64 };
    let rng = ctx.rng();
    let mut waves = Vec::with_capacity(n * n);
    for ku in 0..n {
        for kv in 0..n {
            let (fu, fv) = (signed(ku), signed(kv));
            let r = fu.hypot(fv);
            if r == 0.0 {
                continue;
            }
            waves.push((fu, fv, r.powf(exponent), rng.gen_range(0.0..TAU)));
        }
    }
    let mut field = vec![0f64; n * n];
    for (i, v) in field.iter_mut().enumerate() {
        let (x, y) = ((i % n) as f64, (i / n) as f64);
        *v = waves
            .iter()
            .map(|&(fu, fv, amp, phase)| amp * (TAU * (fu * x + fv * y) / n as f64 + phase).cos())
            .sum();
    }
    let lo = field.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = field.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    GrayImage::from_fn(side, side, |x, y| {
        let v = field[(y * side + x) as usize];
        let t = if span > f64::EPSILON { (v - lo) / span } else { 0.5 };
        Luma([to_u8((t * 255.0) as f32)])
    })
}

/// Upscale `mask` to the image and scale brightness between 0.5x (mask 0) and 1.5x (mask 255).
fn modulate(mut img: RgbImage, mask: &GrayImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let mask = image::imageops::resize(mask, w, h, FilterType::CatmullRom);
    for (px, m) in img.pixels_mut().zip(mask.pixels()) {
        let gain = 0.5 + f32::from(m[0]) / 255.0;
        for c in 0..3 {
            px[c] = to_u8(f32::from(px[c]) * gain);
        }
    }
    img
}

#[cfg(test)]
#[path = "../../tests/unit/ops/texture.rs"]
mod tests;
