use image::{Rgb, RgbImage, imageops::FilterType};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use rand::Rng;

use super::kernel::{blend, map_channels, to_u8};
use super::{OpContext, OperatorRegistry};
use crate::foundation::error::AugsweepResult;
use crate::sampler::ConcreteParams;

const HAZE: [f32; 3] = [235.0, 238.0, 242.0];
const RAIN: Rgb<u8> = Rgb([200, 200, 210]);
const SNOW: Rgb<u8> = Rgb([250, 250, 250]);

pub(super) fn register(reg: &mut OperatorRegistry) {
    reg.register_rgb("Clouds", &["density"], clouds);
    reg.register_rgb("Fog", &["density"], |p, img, _| {
        let d = p.require("density")?.clamp(0.0, 1.0) as f32;
        Ok(toward_haze(img, |_, _| d))
    });
    reg.register_rgb("Rain", &["drop_length"], rain);
    reg.register_rgb("Snowflakes", &["flake_density"], snowflakes);
}

fn toward_haze(mut img: RgbImage, amount: impl Fn(u32, u32) -> f32) -> RgbImage {
    for (x, y, px) in img.enumerate_pixels_mut() {
        let a = amount(x, y).clamp(0.0, 1.0);
        for c in 0..3 {
            px[c] = to_u8(f32::from(px[c]) * (1.0 - a) + HAZE[c] * a);
        }
    }
    img
}

/// Low-frequency random field upscaled smoothly to the image size, values in `[0, 1]`.
fn cloud_field(w: u32, h: u32, ctx: &mut OpContext) -> image::GrayImage {
    let cells = 6u32;
    let rng = ctx.rng();
    let coarse = image::GrayImage::from_fn(cells, cells, |_, _| image::Luma([rng.gen_range(0..=255u8)]));
    image::imageops::resize(&coarse, w, h, FilterType::Triangle)
}

fn clouds(p: &ConcreteParams, img: RgbImage, ctx: &mut OpContext) -> AugsweepResult<RgbImage> {
    let d = p.require("density")?.clamp(0.0, 1.0) as f32;
    if d == 0.0 {
        return Ok(img);
    }
    let (w, h) = img.dimensions();
    let field = cloud_field(w, h, ctx);
    Ok(toward_haze(img, |x, y| {
        2.0 * d * f32::from(field.get_pixel(x, y)[0]) / 255.0
    }))
}

fn rain(p: &ConcreteParams, img: RgbImage, ctx: &mut OpContext) -> AugsweepResult<RgbImage> {
    let (w, h) = img.dimensions();
    let short = w.min(h) as f32;
    let len = (p.require("drop_length")? as f32 * short * 0.5).max(2.0);
    let width = 1 + (p.get_or("drop_width", 0.1) * 5.0).round().clamp(0.0, 4.0) as i32;
    let drops = ((w as f32 * h as f32) / 150.0).ceil() as u32;
    let mut streaks = img.clone();
    let rng = ctx.rng();
    for _ in 0..drops {
        let x = rng.gen_range(0.0..w as f32);
        let y = rng.gen_range(0.0..h as f32);
        let slant = rng.gen_range(-0.3..=-0.1f32);
        let end = (x + slant * len, y + len);
        for off in 0..width {
            let o = off as f32;
            draw_line_segment_mut(&mut streaks, (x + o, y), (end.0 + o, end.1), RAIN);
        }
    }
    // translucent streaks over a slightly darkened scene
    let darker = map_channels(img, |v| v * 0.9);
    blend(&darker, &streaks, 0.6)
}

fn snowflakes(p: &ConcreteParams, mut img: RgbImage, ctx: &mut OpContext) -> AugsweepResult<RgbImage> {
    let (w, h) = img.dimensions();
    let density = p.require("flake_density")?.clamp(0.0, 1.0) as f32;
    let size = p.get_or("flake_size", 0.2).clamp(0.0, 1.0) as f32;
    let radius = ((size * w.min(h) as f32) / 20.0).round().max(1.0) as i32;
    let count = (density * (w as f32 * h as f32) / 50.0).round() as u32;
    let rng = ctx.rng();
    for _ in 0..count {
        let cx = rng.gen_range(0..w) as i32;
        let cy = rng.gen_range(0..h) as i32;
        let r = rng.gen_range(1..=radius);
        draw_filled_circle_mut(&mut img, (cx, cy), r, SNOW);
    }
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/weather.rs"]
mod tests;
