use image::{ImageBuffer, Luma, Rgb, RgbImage, imageops::FilterType};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{
    Interpolation, Projection, rotate_about_center, warp, warp_with,
};
use kurbo::{Affine, Vec2};
use rand::Rng;

use super::{OpContext, OperatorRegistry};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::sampler::ConcreteParams;

const FILL: Rgb<u8> = Rgb([0, 0, 0]);

pub(super) fn register(reg: &mut OperatorRegistry) {
    reg.register_rgb("Affine", &["scale", "rotate"], affine);
    reg.register_rgb("Rotate", &["rotate"], rotate);
    reg.register_rgb("Scale", &["scale"], scale);
    reg.register_rgb("Translate", &["translate_percent"], translate);
    reg.register_rgb("Shear", &["shear"], shear);
    reg.register_rgb("Resize", &["size"], resize);
    reg.register_rgb("PerspectiveTransform", &["scale"], perspective);
    reg.register_rgb("ElasticTransformation", &["alpha", "sigma"], elastic);
    reg.register_rgb("Crop", &["border_ratio"], crop);
    reg.register_rgb("FlipLeftRight", &[], |_, img, _| Ok(image::imageops::flip_horizontal(&img)));
    reg.register_rgb("FlipUpDown", &[], |_, img, _| Ok(image::imageops::flip_vertical(&img)));
}

/// Forward transform about the image center: scale, then rotate, then translate.
fn affine_about_center(w: u32, h: u32, scale: f64, degrees: f64, translate: Vec2) -> Affine {
    let center = Vec2::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
    Affine::translate(center + translate)
        * Affine::rotate(degrees.to_radians())
        * Affine::scale(scale)
        * Affine::translate(-center)
}

fn projection_from(a: Affine) -> AugsweepResult<Projection> {
    let [a, b, c, d, e, f] = a.as_coeffs();
    Projection::from_matrix([
        a as f32, c as f32, e as f32, b as f32, d as f32, f as f32, 0.0, 0.0, 1.0,
    ])
    .ok_or_else(|| AugsweepError::operator("affine transform is not invertible"))
}

fn affine(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let scale = p.require("scale")?;
    if scale <= 0.0 {
        return Err(AugsweepError::operator(format!("affine scale {scale} must be > 0")));
    }
    let t = p.get_or("translate_percent", 0.0);
    let (w, h) = img.dimensions();
    let shift = Vec2::new(t * f64::from(w), t * f64::from(h));
    let m = affine_about_center(w, h, scale, p.require("rotate")?, shift);
    Ok(warp(&img, &projection_from(m)?, Interpolation::Bilinear, FILL))
}

fn scale(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let s = p.require("scale")?;
    if s <= 0.0 {
        return Err(AugsweepError::operator(format!("scale factor {s} must be > 0")));
    }
    let (w, h) = img.dimensions();
    let m = affine_about_center(w, h, s, 0.0, Vec2::ZERO);
    Ok(warp(&img, &projection_from(m)?, Interpolation::Bilinear, FILL))
}

/// Both axes move by the same fraction of their side.
fn translate(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let t = p.require("translate_percent")?;
    let (w, h) = img.dimensions();
    let m = Affine::translate(Vec2::new(t * f64::from(w), t * f64::from(h)));
    Ok(warp(&img, &projection_from(m)?, Interpolation::Bilinear, FILL))
}

fn shear(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let degrees = p.require("shear")?;
    if degrees.abs() >= 89.0 {
        return Err(AugsweepError::operator(format!(
            "shear of {degrees} degrees is out of range"
        )));
    }
    let (w, h) = img.dimensions();
    let center = Vec2::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
    let m = Affine::translate(center)
        * Affine::skew(degrees.to_radians().tan(), 0.0)
        * Affine::translate(-center);
    Ok(warp(&img, &projection_from(m)?, Interpolation::Bilinear, FILL))
}

/// Uniform noise in `[-1, 1]` per pixel, gaussian-smoothed by `sigma`, scaled by `alpha` pixels.
fn displacement(
    w: u32,
    h: u32,
    sigma: f32,
    alpha: f32,
    ctx: &mut OpContext,
) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let rng = ctx.rng();
    let raw = ImageBuffer::from_fn(w, h, |_, _| Luma([rng.gen_range(-1.0f32..=1.0)]));
    let mut field = gaussian_blur_f32(&raw, sigma);
    for px in field.pixels_mut() {
        px[0] *= alpha;
    }
    field
}

fn elastic(p: &ConcreteParams, img: RgbImage, ctx: &mut OpContext) -> AugsweepResult<RgbImage> {
    let alpha = p.require("alpha")?;
    let sigma = p.require("sigma")?;
    if alpha < 0.0 || sigma <= 0.0 {
        return Err(AugsweepError::operator(format!(
            "elastic alpha {alpha} must be >= 0 and sigma {sigma} > 0"
        )));
    }
    if alpha == 0.0 {
        return Ok(img);
    }
    let (w, h) = img.dimensions();
    let dx = displacement(w, h, sigma as f32, alpha as f32, ctx);
    let dy = displacement(w, h, sigma as f32, alpha as f32, ctx);
    // bilinear sampling needs a right and bottom neighbor inside the image
    let (maxx, maxy) = ((w as f32 - 1.001).max(0.0), (h as f32 - 1.001).max(0.0));
    Ok(warp_with(
        &img,
        |x, y| {
            let (ix, iy) = (x.clamp(0.0, maxx) as u32, y.clamp(0.0, maxy) as u32);
            (
                (x + dx.get_pixel(ix, iy)[0]).clamp(0.0, maxx),
                (y + dy.get_pixel(ix, iy)[0]).clamp(0.0, maxy),
            )
        },
        Interpolation::Bilinear,
        FILL,
    ))
}

fn rotate(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let theta = p.require("rotate")?.to_radians() as f32;
    Ok(rotate_about_center(&img, theta, Interpolation::Bilinear, FILL))
}

fn resize(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let s = p.require("size")?;
    if s <= 0.0 {
        return Err(AugsweepError::operator(format!("resize factor {s} must be > 0")));
    }
    let (w, h) = img.dimensions();
    let nw = ((f64::from(w) * s).round() as u32).max(1);
    let nh = ((f64::from(h) * s).round() as u32).max(1);
    Ok(image::imageops::resize(&img, nw, nh, FilterType::Triangle))
}

/// Move each corner inward by up to `scale` of the image size, then map the image onto the
/// resulting quadrilateral.
fn perspective(p: &ConcreteParams, img: RgbImage, ctx: &mut OpContext) -> AugsweepResult<RgbImage> {
    let scale = p.require("scale")?.clamp(0.0, 0.45) as f32;
    let (w, h) = img.dimensions();
    let (wf, hf) = (w as f32, h as f32);
    let from = [(0.0, 0.0), (wf, 0.0), (wf, hf), (0.0, hf)];
    let dirs = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];
    let rng = ctx.rng();
    let mut to = from;
    for (pt, (dx, dy)) in to.iter_mut().zip(dirs) {
        let jx: f32 = if scale > 0.0 { rng.gen_range(0.0..=scale) } else { 0.0 };
        let jy: f32 = if scale > 0.0 { rng.gen_range(0.0..=scale) } else { 0.0 };
        pt.0 += dx * jx * wf;
        pt.1 += dy * jy * hf;
    }
    let proj = Projection::from_control_points(from, to)
        .ok_or_else(|| AugsweepError::operator("degenerate perspective control points"))?;
    Ok(warp(&img, &proj, Interpolation::Bilinear, FILL))
}

fn crop(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let b = p.require("border_ratio")?;
    if !(0.0..0.5).contains(&b) {
        return Err(AugsweepError::operator(format!(
            "crop border ratio {b} must be in [0, 0.5)"
        )));
    }
    let (w, h) = img.dimensions();
    let bx = (f64::from(w) * b).round() as u32;
    let by = (f64::from(h) * b).round() as u32;
    let cw = w.saturating_sub(2 * bx).max(1);
    let ch = h.saturating_sub(2 * by).max(1);
    Ok(image::imageops::crop_imm(&img, bx.min(w - 1), by.min(h - 1), cw, ch).to_image())
}

#[cfg(test)]
#[path = "../../tests/unit/ops/geometric.rs"]
mod tests;
