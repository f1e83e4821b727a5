use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::edges::canny;
use imageproc::filter::filter3x3;
use rand::Rng;

use super::kernel::{blend, luma, to_u8};
use super::{OpContext, OperatorRegistry};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::sampler::ConcreteParams;

const GRID_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

pub(super) fn register(reg: &mut OperatorRegistry) {
    reg.register_rgb("Canny", &["alpha"], |p, img, _| {
        let alpha = p.require("alpha")? as f32;
        let gray = GrayImage::from_fn(img.width(), img.height(), |x, y| {
            Luma([to_u8(luma(img.get_pixel(x, y)))])
        });
        let edges = canny(&gray, 50.0, 100.0);
        let edges = RgbImage::from_fn(img.width(), img.height(), |x, y| {
            let v = edges.get_pixel(x, y)[0];
            Rgb([v, v, v])
        });
        blend(&img, &edges, alpha)
    });
    reg.register_rgb("DirectedEdgeDetect", &["alpha"], directed_edges);
    reg.register_rgb("InterferenceLines", &["lines"], interference_lines);
    reg.register_rgb("Grid", &["spacing"], grid);
}

/// 3x3 kernel weighting each neighbor by how well its direction matches `direction`
/// (a fraction of a full turn), with the center balancing the sum to zero.
fn directed_kernel(direction: f64) -> [f32; 9] {
    let target = direction * std::f64::consts::TAU;
    let mut k = [0f32; 9];
    let mut total = 0f32;
    for y in 0..3 {
        for x in 0..3 {
            if x == 1 && y == 1 {
                continue;
            }
            let ang = (f64::from(y) - 1.0).atan2(f64::from(x) - 1.0);
            let w = (ang - target).cos().max(0.0) as f32;
            k[(y * 3 + x) as usize] = w;
            total += w;
        }
    }
    k[4] = -total;
    k
}

fn directed_edges(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let alpha = p.require("alpha")? as f32;
    let k = directed_kernel(p.get_or("direction", 0.0));
    let gray = ImageBuffer::<Luma<f32>, Vec<f32>>::from_fn(img.width(), img.height(), |x, y| {
        Luma([luma(img.get_pixel(x, y))])
    });
    let response: ImageBuffer<Luma<f32>, Vec<f32>> = filter3x3(&gray, &k);
    let edges = RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let v = to_u8(response.get_pixel(x, y)[0].abs());
        Rgb([v, v, v])
    });
    blend(&img, &edges, alpha)
}

/// Random colored segments, 1 to 3 pixels thick, spanning the image.
fn interference_lines(
    p: &ConcreteParams,
    mut img: RgbImage,
    ctx: &mut OpContext,
) -> AugsweepResult<RgbImage> {
    let n = p.require("lines")?.round();
    if !(0.0..=10_000.0).contains(&n) {
        return Err(AugsweepError::operator(format!("line count {n} is out of range")));
    }
    let (w, h) = img.dimensions();
    let (wf, hf) = (w as f32, h as f32);
    let rng = ctx.rng();
    for _ in 0..n as u32 {
        let start = (rng.gen_range(0.0..wf), rng.gen_range(0.0..hf));
        let end = (rng.gen_range(0.0..wf), rng.gen_range(0.0..hf));
        let color = Rgb([rng.gen_range(0..=255u8), rng.gen_range(0..=255u8), rng.gen_range(0..=255u8)]);
        let thickness = rng.gen_range(1..=3u32);
        for t in 0..thickness {
            let o = t as f32;
            draw_line_segment_mut(&mut img, (start.0, start.1 + o), (end.0, end.1 + o), color);
        }
    }
    Ok(img)
}

fn grid(p: &ConcreteParams, mut img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let spacing = p.require("spacing")?.round();
    if spacing < 2.0 {
        return Err(AugsweepError::operator(format!(
            "grid spacing {spacing} must be at least 2"
        )));
    }
    let step = spacing as usize;
    let (w, h) = img.dimensions();
    for x in (0..w).step_by(step) {
        for y in 0..h {
            img.put_pixel(x, y, GRID_GRAY);
        }
    }
    for y in (0..h).step_by(step) {
        for x in 0..w {
            img.put_pixel(x, y, GRID_GRAY);
        }
    }
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/edge.rs"]
mod tests;
