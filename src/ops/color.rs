use image::{DynamicImage, Rgb, RgbImage};

use super::kernel::{luma, map_channels, to_u8};
use super::{OpContext, OperatorRegistry};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::sampler::ConcreteParams;

pub(super) fn register(reg: &mut OperatorRegistry) {
    reg.register_rgb("AddToBrightness", &["add"], |p, img, _| {
        let add = p.require("add")? as f32;
        Ok(map_channels(img, |v| v + add))
    });
    reg.register_rgb("MultiplyBrightness", &["mul"], |p, img, _| {
        let mul = p.require("mul")? as f32;
        Ok(map_channels(img, |v| v * mul))
    });
    reg.register_rgb("AddToHue", &["value"], |p, img, _| {
        let deg = p.require("value")?.round() as i32;
        Ok(DynamicImage::ImageRgb8(img).huerotate(deg).into_rgb8())
    });
    reg.register_rgb("AddToSaturation", &["value"], add_to_saturation);
    reg.register_rgb("Grayscale", &["alpha"], grayscale);
    reg.register_rgb("ChangeColorTemperature", &["kelvin"], color_temperature);
    reg.register_rgb("Posterize", &["nb_bits"], posterize);
}

fn add_to_saturation(
    p: &ConcreteParams,
    mut img: RgbImage,
    _: &mut OpContext,
) -> AugsweepResult<RgbImage> {
    let delta = (p.require("value")? / 255.0) as f32;
    for px in img.pixels_mut() {
        let (h, s, v) = rgb_to_hsv(px);
        *px = hsv_to_rgb(h, (s + delta).clamp(0.0, 1.0), v);
    }
    Ok(img)
}

fn grayscale(p: &ConcreteParams, mut img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let alpha = p.require("alpha")?.clamp(0.0, 1.0) as f32;
    for px in img.pixels_mut() {
        let y = luma(px);
        for c in 0..3 {
            px[c] = to_u8(f32::from(px[c]) * (1.0 - alpha) + y * alpha);
        }
    }
    Ok(img)
}

fn color_temperature(
    p: &ConcreteParams,
    mut img: RgbImage,
    _: &mut OpContext,
) -> AugsweepResult<RgbImage> {
    let kelvin = p.require("kelvin")?;
    if !(1000.0..=40000.0).contains(&kelvin) {
        return Err(AugsweepError::operator(format!(
            "color temperature {kelvin}K is outside 1000..=40000"
        )));
    }
    let tint = kelvin_to_rgb(kelvin);
    let max = tint.iter().cloned().fold(f32::MIN, f32::max).max(1.0);
    let gains = tint.map(|c| c / max);
    for px in img.pixels_mut() {
        for c in 0..3 {
            px[c] = to_u8(f32::from(px[c]) * gains[c]);
        }
    }
    Ok(img)
}

fn posterize(p: &ConcreteParams, mut img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let bits = p.require("nb_bits")?.round().clamp(1.0, 8.0) as u32;
    let mask = (0xFFu32 << (8 - bits)) as u8;
    for px in img.pixels_mut() {
        for c in 0..3 {
            px[c] &= mask;
        }
    }
    Ok(img)
}

/// Black-body color approximation, channels in `0..=255`.
fn kelvin_to_rgb(kelvin: f64) -> [f32; 3] {
    let t = kelvin / 100.0;
    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_727_446 * (t - 60.0).powf(-0.133_204_759_2)
    };
    let g = if t <= 66.0 {
        99.470_802_586_1 * t.ln() - 161.119_568_166_1
    } else {
        288.122_169_528_3 * (t - 60.0).powf(-0.075_514_849_2)
    };
    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (t - 10.0).ln() - 305.044_792_730_7
    };
    [r, g, b].map(|v| v.clamp(0.0, 255.0) as f32)
}

/// Hue in degrees, saturation and value in `[0, 1]`.
pub(super) fn rgb_to_hsv(px: &Rgb<u8>) -> (f32, f32, f32) {
    let [r, g, b] = px.0.map(|c| f32::from(c) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    let h = if d == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / d + 2.0)
    } else {
        60.0 * ((r - g) / d + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { d / max };
    (h, s, max)
}

pub(super) fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
    let c = v * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    Rgb([r, g, b].map(|ch| to_u8((ch + m) * 255.0)))
}

#[cfg(test)]
#[path = "../../tests/unit/ops/color.rs"]
mod tests;
